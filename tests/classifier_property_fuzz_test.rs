use fallback_overlay::{Role, ViewDescriptor, classify};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;

fn role_segment_strategy() -> BoxedStrategy<&'static str> {
    prop_oneof![Just("customer"), Just("staff"), Just("admin")].boxed()
}

fn unknown_segment_strategy() -> BoxedStrategy<String> {
    // Segments that are never a known role and never `login` itself.
    "[a-km-z][a-z0-9_-]{0,11}"
        .prop_filter("must not collide with reserved segments", |segment| {
            !matches!(segment.as_str(), "customer" | "staff" | "admin" | "login")
        })
        .boxed()
}

fn plain_path_strategy() -> BoxedStrategy<String> {
    vec(unknown_segment_strategy(), 0..=4)
        .prop_map(|segments| format!("/{}", segments.join("/")))
        .boxed()
}

fn suffix_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just(String::new()),
        "[a-z0-9=&]{0,8}".prop_map(|query| format!("?{query}")),
        "[a-z0-9]{0,8}".prop_map(|hash| format!("#{hash}")),
    ]
    .boxed()
}

fn role_for_segment(segment: &str) -> Role {
    match segment {
        "customer" => Role::Customer,
        "staff" => Role::Staff,
        "admin" => Role::Admin,
        other => panic!("strategy produced an unexpected role segment: {other}"),
    }
}

fn assert_classifies_as(path: &str, expected: ViewDescriptor) -> TestCaseResult {
    let actual = classify(path);
    prop_assert_eq!(actual, expected, "path: {}", path);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn known_role_after_login_classifies_as_that_role(
        prefix in plain_path_strategy(),
        role in role_segment_strategy(),
        suffix in suffix_strategy(),
    ) {
        let path = format!("{}/login/{role}{suffix}", prefix.trim_end_matches('/'));
        assert_classifies_as(&path, ViewDescriptor::Login(role_for_segment(role)))?;
    }

    #[test]
    fn paths_without_a_login_segment_classify_as_chooser(
        path in plain_path_strategy(),
        suffix in suffix_strategy(),
    ) {
        assert_classifies_as(&format!("{path}{suffix}"), ViewDescriptor::Chooser)?;
    }

    #[test]
    fn unknown_role_segments_degrade_to_customer(
        prefix in plain_path_strategy(),
        role in unknown_segment_strategy(),
    ) {
        let path = format!("{}/login/{role}", prefix.trim_end_matches('/'));
        assert_classifies_as(&path, ViewDescriptor::Login(Role::Customer))?;
    }

    #[test]
    fn classification_is_deterministic(
        path in plain_path_strategy(),
        role in role_segment_strategy(),
        with_login in any::<bool>(),
    ) {
        let path = if with_login {
            format!("{}/login/{role}", path.trim_end_matches('/'))
        } else {
            path
        };
        prop_assert_eq!(classify(&path), classify(&path));
    }
}
