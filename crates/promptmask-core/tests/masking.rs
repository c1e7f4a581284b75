use promptmask_core::{mask_prompt, unmask_response, Category, Mapping, Masker};

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn email_and_disease() {
    let r = mask_prompt("My email is john@example.com and I have diabetes", false).unwrap();
    assert_eq!(r.masked_text, "My email is [EMAIL_0] and I have [DISEASE_0]");
    assert_eq!(count(&r.masked_text, "[EMAIL_0]"), 1);
    assert_eq!(count(&r.masked_text, "[DISEASE_0]"), 1);
    assert_eq!(r.mapping.get("[EMAIL_0]"), Some("john@example.com"));
    assert_eq!(r.mapping.get("[DISEASE_0]"), Some("diabetes"));
    assert_eq!(r.mapping.len(), 2);
}

#[test]
fn adjacent_age_and_gender_do_not_overlap() {
    let text = "I'm a 30-year-old female with depression. My phone is 555-123-4567";
    let r = mask_prompt(text, false).unwrap();
    assert_eq!(
        r.masked_text,
        "I'm a [AGE_0] [GENDER_0] with [MENTAL_HEALTH_0]. My phone is [PHONE_0]"
    );
    let cats: Vec<Category> = r.detected_entities.iter().map(|e| e.category).collect();
    assert_eq!(cats, vec![Category::Age, Category::Gender, Category::MentalHealth, Category::Phone]);
    assert_eq!(r.mapping.get("[AGE_0]"), Some("30-year-old"));
    assert_eq!(r.mapping.get("[GENDER_0]"), Some("female"));
    assert_eq!(unmask_response(&r.masked_text, &r.mapping), text);
}

#[test]
fn counters_start_at_zero_and_ascend() {
    let r = mask_prompt("anxiety and depression", false).unwrap();
    assert_eq!(r.masked_text, "[MENTAL_HEALTH_0] and [MENTAL_HEALTH_1]");
}

#[test]
fn no_sensitive_content() {
    let text = "What is a good recipe for banana bread?";
    let r = mask_prompt(text, false).unwrap();
    assert_eq!(r.masked_text, text);
    assert!(r.mapping.is_empty());
    assert!(r.detected_entities.is_empty());
}

#[test]
fn location_prefers_longest_match() {
    let text = "I live in New York and need mental health support. I'm 25 years old.";
    let r = mask_prompt(text, false).unwrap();
    assert_eq!(
        r.masked_text,
        "I live in [LOCATION_0] and need [MENTAL_HEALTH_0] support. I'm [AGE_0]."
    );

    let r = mask_prompt("moved from West Virginia to Virginia Beach", false).unwrap();
    assert_eq!(r.masked_text, "moved from [LOCATION_0] to [LOCATION_1]");
    assert_eq!(r.mapping.get("[LOCATION_0]"), Some("West Virginia"));
    assert_eq!(r.mapping.get("[LOCATION_1]"), Some("Virginia Beach"));
}

#[test]
fn international_phone_beats_embedded_us_number() {
    let r = mask_prompt("call +1-234-567-8900 today", false).unwrap();
    assert_eq!(r.masked_text, "call [PHONE_0] today");
    assert_eq!(r.mapping.get("[PHONE_0]"), Some("+1-234-567-8900"));
}

#[test]
fn entities_listed_in_text_order() {
    let r = mask_prompt(
        "I'm a 30-year-old female with diabetes living in San Francisco. Email: patient@example.com",
        false,
    )
    .unwrap();
    let shown: Vec<String> = r.detected_entities.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        shown,
        vec![
            "AGE: 30-year-old",
            "GENDER: female",
            "DISEASE: diabetes",
            "LOCATION: San Francisco",
            "EMAIL: patient@example.com",
        ]
    );
    let starts: Vec<usize> = r.detected_entities.iter().map(|e| e.start).collect();
    assert!(starts.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn case_insensitive_vocabulary_keeps_original_casing() {
    let r = mask_prompt("Diagnosed with PTSD and Cancer", false).unwrap();
    assert_eq!(r.masked_text, "Diagnosed with [MENTAL_HEALTH_0] and [DISEASE_0]");
    assert_eq!(r.mapping.get("[MENTAL_HEALTH_0]"), Some("PTSD"));
    assert_eq!(r.mapping.get("[DISEASE_0]"), Some("Cancer"));
}

#[test]
fn unmask_model_response() {
    let mapping: Mapping = [
        ("[AGE_0]", "25 years old"),
        ("[MENTAL_HEALTH_0]", "anxiety"),
        ("[EMAIL_0]", "support@example.com"),
        ("[LOCATION_0]", "New York"),
    ]
    .into_iter()
    .collect();
    let masked = "At [AGE_0], dealing with [MENTAL_HEALTH_0] is common. Contact [EMAIL_0] for support in [LOCATION_0].";
    assert_eq!(
        unmask_response(masked, &mapping),
        "At 25 years old, dealing with anxiety is common. Contact support@example.com for support in New York."
    );
}

#[test]
fn unmask_ignores_absent_placeholders() {
    let mapping: Mapping = [("[DISEASE_3]", "lupus")].into_iter().collect();
    let masked = "Nothing to restore here [GENDER_0]";
    assert_eq!(unmask_response(masked, &mapping), masked);
}

#[test]
fn repeated_values_get_distinct_placeholders() {
    let r = Masker::new().mask("asthma, asthma", false).unwrap();
    assert_eq!(r.masked_text, "[DISEASE_0], [DISEASE_1]");
    assert_eq!(r.mapping.len(), 2);
}

#[test]
fn result_serializes_with_wire_names() {
    let r = mask_prompt("a@b.io", false).unwrap();
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["mapping"]["[EMAIL_0]"], "a@b.io");
    assert_eq!(v["detected_entities"][0]["category"], "EMAIL");
}

#[test]
fn masker_is_shareable_across_threads() {
    let masker = Masker::new();
    std::thread::scope(|s| {
        for i in 0..4 {
            let m = &masker;
            s.spawn(move || {
                let text = format!("user{i}@example.com has asthma");
                let r = m.mask(&text, false).unwrap();
                assert_eq!(r.masked_text, "[EMAIL_0] has [DISEASE_0]");
                assert_eq!(m.unmask(&r.masked_text, &r.mapping), text);
            });
        }
    });
}
