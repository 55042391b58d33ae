use career_types::models::Profile;

pub const SYSTEM_PROMPT: &str =
    "You are an experienced career adviser. Give practical, specific and encouraging guidance.";

/// Headings the model is asked to use, in order.
pub const SECTION_HEADINGS: [&str; 4] = [
    "Suitable Career Paths",
    "Missing Skills",
    "Recommended Resources",
    "Learning Roadmap",
];

/// Build the user instruction for a profile.
///
/// Field values are inserted as-is. The output is deterministic for a given
/// profile.
pub fn build_prompt(profile: &Profile) -> String {
    let mut prompt = format!(
        "Give personalised career advice for the person described below.\n\n\
         Name: {}\n\
         Education: {}\n\
         Skills: {}\n\
         Interests: {}\n\
         Goals: {}\n\n\
         Structure the answer in exactly four sections. Start each section with its \
         numbered heading on its own line:\n",
        profile.name, profile.education, profile.skills, profile.interests, profile.goals,
    );

    for (i, heading) in SECTION_HEADINGS.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, heading));
    }

    prompt
}

/// Headings from [`SECTION_HEADINGS`] that do not appear in `advice`.
pub fn missing_sections(advice: &str) -> Vec<&'static str> {
    let lower = advice.to_lowercase();
    SECTION_HEADINGS
        .iter()
        .copied()
        .filter(|h| !lower.contains(&h.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            name: "Alice".into(),
            education: "BSc Mathematics".into(),
            skills: "Python, SQL".into(),
            interests: "data, teaching".into(),
            goals: "become a data engineer".into(),
        }
    }

    #[test]
    fn prompt_embeds_fields_verbatim() {
        let p = Profile {
            skills: "C++ & {templates} \"quoted\"".into(),
            ..profile()
        };
        let prompt = build_prompt(&p);

        assert!(prompt.contains("Name: Alice\n"));
        assert!(prompt.contains("Education: BSc Mathematics\n"));
        assert!(prompt.contains("Skills: C++ & {templates} \"quoted\"\n"));
        assert!(prompt.contains("Interests: data, teaching\n"));
        assert!(prompt.contains("Goals: become a data engineer\n"));
    }

    #[test]
    fn prompt_lists_sections_in_order() {
        let prompt = build_prompt(&profile());
        let positions: Vec<usize> = SECTION_HEADINGS
            .iter()
            .enumerate()
            .map(|(i, h)| prompt.find(&format!("{}. {}", i + 1, h)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt(&profile()), build_prompt(&profile()));
    }

    #[test]
    fn missing_sections_is_case_insensitive() {
        let advice = "1. SUITABLE CAREER PATHS\n...\n2. Missing skills\n...\n4. Learning Roadmap\n";
        assert_eq!(missing_sections(advice), vec!["Recommended Resources"]);
        assert_eq!(missing_sections("").len(), 4);
    }
}
