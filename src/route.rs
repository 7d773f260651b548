use std::sync::OnceLock;

use fancy_regex::Regex;

use super::*;

/// What the current path calls for: the role chooser, or a role-specific
/// login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDescriptor {
    Chooser,
    Login(Role),
}

// A `login` path segment with an optional trailing role segment. The role
// must be a whole segment of its own, so `/loginx` and `/login-help` do
// not classify as login paths.
fn login_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|/)login(?:/([^/?#]*))?(?:/|$)")
            .expect("login route pattern is a valid regex")
    })
}

/// Classifies a location path into a [`ViewDescriptor`].
///
/// Pure and total: unrecognized or absent role segments degrade to
/// [`Role::Customer`] rather than failing, and any path without a `login`
/// segment classifies as the chooser. Query and hash suffixes are ignored.
pub fn classify(path: &str) -> ViewDescriptor {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    match login_pattern().captures(path) {
        Ok(Some(captures)) => {
            let role = captures
                .get(1)
                .map(|segment| segment.as_str())
                .and_then(Role::from_segment)
                .unwrap_or(Role::Customer);
            ViewDescriptor::Login(role)
        }
        _ => ViewDescriptor::Chooser,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_classify_as_login() {
        assert_eq!(
            classify("/login/customer"),
            ViewDescriptor::Login(Role::Customer)
        );
        assert_eq!(classify("/login/staff"), ViewDescriptor::Login(Role::Staff));
        assert_eq!(classify("/login/admin"), ViewDescriptor::Login(Role::Admin));
    }

    #[test]
    fn missing_or_unknown_role_defaults_to_customer() {
        assert_eq!(classify("/login"), ViewDescriptor::Login(Role::Customer));
        assert_eq!(classify("/login/"), ViewDescriptor::Login(Role::Customer));
        assert_eq!(
            classify("/login/supervisor"),
            ViewDescriptor::Login(Role::Customer)
        );
        assert_eq!(
            classify("/login/Staff"),
            ViewDescriptor::Login(Role::Customer)
        );
    }

    #[test]
    fn non_login_paths_classify_as_chooser() {
        assert_eq!(classify("/"), ViewDescriptor::Chooser);
        assert_eq!(classify("/index.html"), ViewDescriptor::Chooser);
        assert_eq!(classify("/staff/home"), ViewDescriptor::Chooser);
        assert_eq!(classify("/loginx"), ViewDescriptor::Chooser);
        assert_eq!(classify("/my-login-help"), ViewDescriptor::Chooser);
        assert_eq!(classify(""), ViewDescriptor::Chooser);
    }

    #[test]
    fn query_and_hash_do_not_contribute_a_role() {
        assert_eq!(
            classify("/login/admin?next=%2Fhome"),
            ViewDescriptor::Login(Role::Admin)
        );
        assert_eq!(
            classify("/login#staff"),
            ViewDescriptor::Login(Role::Customer)
        );
        assert_eq!(classify("/home?login=1"), ViewDescriptor::Chooser);
    }

    #[test]
    fn nested_login_segment_still_classifies() {
        assert_eq!(
            classify("/app/login/staff"),
            ViewDescriptor::Login(Role::Staff)
        );
        assert_eq!(
            classify("/login/staff/extra"),
            ViewDescriptor::Login(Role::Staff)
        );
    }
}
