pub mod llm; // Provider client trait + Gemini implementation
pub mod simulation;
