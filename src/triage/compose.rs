use crate::models::GuidanceVariant;

/// Reply when no corpus keyword occurs in the query.
pub const NO_MATCH_RESPONSE: &str = "I understand you're not feeling well. While I can provide guidance for common symptoms I don't have specific information about what you're experiencing right now.

I'd recommend:
1. **Describing your symptoms more specifically** - mention the exact discomfort you're feeling
2. **Consulting a healthcare professional** who can properly evaluate your condition
3. **Not ignoring persistent symptoms** - it's always better to get checked

Feel free to describe your symptoms in more detail and I'll do my best to help!";

const OPENING: &str =
    "Thank you for sharing your symptoms. Let me provide you with some helpful information:";

const DISCLAIMER: &str = "**Important Note:** While this information is based on general medical knowledge and can help you manage mild symptoms it should not replace professional medical advice. If you're concerned about your symptoms or if they persist or worsen please consult a healthcare provider for proper evaluation and treatment.";

const FOLLOW_UP: &str = "Is there anything specific about your condition you'd like to know more about?";

/// Assemble the Markdown guidance reply for one variant.
///
/// Sections always appear in this order: understanding, medications, when to
/// seek care, diet, lifestyle, then the disclaimer and follow-up prompt.
pub fn compose_guidance(variant: &GuidanceVariant) -> String {
    let sections = [
        ("Understanding What You're Experiencing", &variant.description),
        ("Recommended Medications", &variant.medicine),
        ("When to Seek Medical Attention", &variant.doctor_consult),
        ("Dietary Recommendations", &variant.food_suggestions),
        ("Lifestyle and Self-Care Tips", &variant.lifestyle_suggestions),
    ];

    let mut out = String::from(OPENING);
    out.push_str("\n\n");
    for (heading, body) in sections {
        out.push_str(&format!("**{heading}:**\n{body}\n\n"));
    }
    out.push_str(DISCLAIMER);
    out.push_str("\n\n");
    out.push_str(FOLLOW_UP);
    out
}
