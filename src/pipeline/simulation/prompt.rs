use crate::models::{
    is_pediatric_department, Case, CaseGenerationOptions, CaseState, Message, CAREGIVER_SECTION,
};

/// Case-history sections every generated case must carry.
pub const REQUIRED_HISTORY_SECTIONS: &[&str] = &[
    "## BIODATA",
    "## Presenting Complaint",
    "## History of Presenting Complaint",
    "## Past Medical and Surgical History",
    "## Drug History",
    "## Family History",
    "## Social History",
    "## Review of Systems",
];

pub const CHILD_SPEAKER_TAG: &str = "[CHILD]:";
pub const CAREGIVER_SPEAKER_TAG: &str = "[CAREGIVER]:";

const UNKNOWN: &str = "Unknown";

/// Build the case-generation prompt for a department.
pub fn build_case_prompt(department_name: &str, options: &CaseGenerationOptions) -> String {
    let pediatric = is_pediatric_department(department_name);

    let mut sections: String = REQUIRED_HISTORY_SECTIONS
        .iter()
        .map(|s| format!("    - {s}\n"))
        .collect();
    if pediatric {
        sections.push_str(&format!(
            "    - {CAREGIVER_SECTION} (Include details about the primary caregiver present - usually parent/guardian, their relationship to child, and their level of involvement)\n"
        ));
    }

    let opening_note = if pediatric {
        " For pediatric cases, this should come from whichever person (child or caregiver) would naturally speak first based on the child's age and condition."
    } else {
        ""
    };

    let mut prompt = format!(
        r#"Generate a realistic and challenging clinical case for a medical student simulation in the '{department_name}' department.
The output MUST be a single, perfectly valid JSON object with this exact structure: {{"diagnosis": string, "primaryInfo": string, "openingLine": string, "visualAppearance": string}}.

- "diagnosis": The most likely diagnosis for the case.
- "primaryInfo": A detailed clinical history string, formatted with markdown headings. This history is the single source of truth for the AI patient. It MUST include all of the following sections:
{sections}- "openingLine": A natural, first-person statement from the patient that initiates the consultation.{opening_note}
- "visualAppearance": A concise description of the patient's visual appearance and clinical state as observed by the doctor upon first seeing them. This should ONLY include what is directly observable and clinically relevant:
    * Physical appearance: thin/overweight, pale/flushed, sweaty/dry
    * Signs of distress: comfortable/uncomfortable, anxious/calm, restless/still
    * Breathing: comfortable at rest/labored/rapid
    * Posture and movement: sitting upright/slouched/lying down, moving freely/guarded
    * Visible clinical signs: cyanosis, jaundice, rashes, swelling
    * General demeanor: alert/drowsy, cooperative/withdrawn
    DO NOT include: names, ages, family relationships, or any non-visual information. Focus purely on immediate visual clinical impressions that would impact the approach to patient care. Keep it to 2-3 sentences.
"#
    );

    if let Some(location) = &options.location {
        let country = &location.country;
        let resources = location.available_resources;
        prompt.push_str(&format!(
            r#"
LOCATION CONTEXT:
- Country: {country}
- Economic Level: {economic}
- Common Local Diseases: {diseases}
- Available Resources: {resources}

Please customize the case considering:
1. Use culturally appropriate names for the patient
2. Consider local disease prevalence - favor conditions common in {country}
3. Tailor investigations based on available resources ({resources})
4. Adjust management protocols to local standards and resource availability
"#,
            economic = location.economic_level,
            diseases = location.common_diseases.join(", "),
        ));
    }

    if !options.avoid_similar_to.is_empty() {
        prompt.push_str(&format!(
            r#"
VARIETY REQUIREMENTS:
- Avoid generating cases similar to these recent diagnoses: {}
- Ensure this case is distinctly different in presentation and pathophysiology
"#,
            options.avoid_similar_to.join(", ")
        ));
    }

    if let Some(difficulty) = options.difficulty {
        prompt.push_str(&format!(
            "\nDIFFICULTY LEVEL: {difficulty} - {}\n",
            difficulty.description()
        ));
    }

    if let Some(category) = options.category {
        prompt.push_str(&format!(
            "\nCASE CATEGORY: {category} - {}\n",
            category.description()
        ));
    }

    prompt.push_str(
        "\nGenerate a case that is educationally valuable and realistic for the specified context.",
    );
    prompt
}

const PEDIATRIC_RULES: &str = r#"
PEDIATRIC CONVERSATION RULES:
- Determine who should respond based on the child's age and question type
- Children under 5: Caregiver answers almost all questions
- Children 5-10: Caregiver answers medical history, medications, development; child can answer about symptoms they feel
- Children 10-15: Child can answer most questions about their experience; caregiver helps with complex medical history
- Children 15+: Child answers most questions; caregiver may add details or concerns

QUESTION TYPES:
- Medical history, medications, allergies, family history: Usually caregiver
- Current symptoms, pain, how they feel: Child if age-appropriate, otherwise caregiver
- What happened, when symptoms started: Both may contribute
- School, friends, activities: Usually child if age-appropriate

RESPONSE FORMAT: Start your response with either "[CHILD]:" or "[CAREGIVER]:" to indicate who is speaking, then the natural response.
"#;

/// Build the in-character patient prompt for the next reply.
///
/// Only student and patient turns are included in the conversation;
/// system notes never reach the model.
pub fn build_patient_prompt(case: &Case, history: &[Message]) -> String {
    let pediatric = case.has_caregiver();
    let role = if pediatric {
        "both a child patient and their caregiver in a pediatric medical simulation"
    } else {
        "a patient in a medical simulation"
    };
    let rules = if pediatric { PEDIATRIC_RULES } else { "" };

    let conversation = history
        .iter()
        .filter(|m| m.sender.is_dialogue())
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are an AI acting as {role}.
Your entire identity and medical history are defined by the PRIMARY_INFORMATION provided below.
Your visual appearance is described in the VISUAL_APPEARANCE section - this is how you look and feel right now.
- You MUST adhere strictly to this information. Do not contradict it.
- If the student asks a question not covered in your primary information, invent a plausible detail that is consistent with the overall diagnosis of '{diagnosis}' and your visual appearance.
- Respond naturally, as a real person would. Be concise.
- NEVER break character. Do not mention that you are an AI. Do not offer a diagnosis. Do not use medical jargon.
- If asked about how you feel or look, respond in a way that's consistent with your visual appearance.
{rules}
PRIMARY_INFORMATION:
{primary_info}

VISUAL_APPEARANCE:
{visual}

CONVERSATION SO FAR:
{conversation}

Patient's response:"#,
        diagnosis = case.diagnosis,
        primary_info = case.primary_info,
        visual = case.visual_appearance,
    )
}

/// Build the investigation-simulation prompt for a free-text plan.
pub fn build_investigation_prompt(plan: &str, case: &Case) -> String {
    format!(
        r#"A medical student has requested investigations for a patient with a likely diagnosis of '{diagnosis}'.
Parse their free-text plan and return a JSON array of results.
The JSON schema for each item must be: {{"name": string, "value": number, "unit": string, "range": {{"low": number, "high": number}}, "status": "Normal" | "High" | "Low" | "Critical"}}.
- Generate medically plausible, realistic values consistent with the diagnosis. Some results should be abnormal to create a challenge.
- FBC should be broken down into Hemoglobin, WBC, Platelets.
- U&E into Sodium, Potassium, Urea, Creatinine.
- LFT into Bilirubin, ALT, AST.
- If a test is mentioned that you cannot simulate, omit it from the final JSON.
- Respond ONLY with the JSON array inside a root object: e.g. {{"results": [...]}}.

The student's plan: "{plan}""#,
        diagnosis = case.diagnosis,
    )
}

/// Department and diagnosis labels, tolerating an incomplete state.
fn case_labels(state: &CaseState) -> (&str, &str) {
    let department = state
        .department
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or(UNKNOWN);
    let diagnosis = state
        .case_details
        .as_ref()
        .map(|c| c.diagnosis.as_str())
        .unwrap_or(UNKNOWN);
    (department, diagnosis)
}

fn transcript_json(messages: &[&Message]) -> String {
    serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string())
}

/// Build the summary-feedback prompt.
pub fn build_feedback_prompt(state: &CaseState) -> String {
    let (department, diagnosis) = case_labels(state);
    let all: Vec<&Message> = state.messages.iter().collect();

    format!(
        r#"You are a senior medical educator. Analyze the student's performance based on the provided case data.
Provide concise, constructive feedback in a JSON object with this exact structure: {{"diagnosis": string, "keyTakeaway": string, "whatYouDidWell": string[], "whatCouldBeImproved": string[], "clinicalTip": string}}.
- "diagnosis" should be the most likely correct diagnosis.
- "keyTakeaway" should be a single, concise sentence summarizing the most critical point from "whatCouldBeImproved".
- "whatYouDidWell" should contain 2-3 positive points.
- "whatCouldBeImproved" should contain 2-3 actionable suggestions.
- "clinicalTip" should be a single, insightful educational takeaway.

Case data:
- Department: {department}
- Correct Diagnosis: {diagnosis}
- Conversation: {conversation}
- Student's Final Diagnosis: {final_diagnosis}
- Student's Management Plan: {plan}"#,
        conversation = transcript_json(&all),
        final_diagnosis = state.final_diagnosis,
        plan = state.management_plan,
    )
}

/// Build the detailed-report prompt with quoted excerpts.
pub fn build_detailed_feedback_prompt(state: &CaseState) -> String {
    let (department, diagnosis) = case_labels(state);

    format!(
        r#"You are a senior medical educator providing an in-depth, written report for a student after a simulated clinical encounter.
You must analyze the entire conversation transcript and the student's final assessment.
Provide a detailed report in a perfectly valid JSON object with the exact structure defined below.

The required JSON structure is:
{{
  "diagnosis": string,
  "keyTakeaway": string,
  "whatYouDidWell": string[],
  "whatCouldBeImproved": string[],
  "clinicalTip": string,
  "positiveQuotes": {{ "quote": string, "explanation": string }}[],
  "improvementQuotes": {{ "quote": string, "explanation": string }}[]
}}

Instructions for generation:
- "diagnosis", "keyTakeaway", etc. should be consistent with the initial summary feedback.
- "positiveQuotes": Find 1-2 specific moments in the transcript where the student excelled. The "quote" must be a direct excerpt from the student's dialogue. The "explanation" should praise the specific technique used (e.g., "Excellent use of an open-ended question to explore the symptom further.").
- "improvementQuotes": Find 1-2 specific moments where the student could have done better. The "quote" must be from the student's dialogue leading up to the missed opportunity. The "explanation" must describe the missed opportunity or a better way to phrase the question (e.g., "After the patient mentioned XYZ, a more targeted follow-up on red flag symptoms was warranted here.").

Case data to analyze:
- Department: {department}
- Correct Diagnosis: {diagnosis}
- Conversation Transcript: {transcript}
- Student's Final Diagnosis: {final_diagnosis}
- Student's Management Plan: {plan}"#,
        transcript = transcript_json(&state.dialogue()),
        final_diagnosis = state.final_diagnosis,
        plan = state.management_plan,
    )
}
