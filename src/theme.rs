use std::fmt;

/// The three portal roles the host platform serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Staff, Role::Admin];

    /// The path segment this role appears as under `/login/`.
    pub fn segment(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    pub(crate) fn from_segment(segment: &str) -> Option<Role> {
        match segment {
            "customer" => Some(Role::Customer),
            "staff" => Some(Role::Staff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Static per-role presentation and demo-credential configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTheme {
    pub accent: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub label: &'static str,
    pub demo_email: &'static str,
    pub demo_password: &'static str,
}

const CUSTOMER_THEME: RoleTheme = RoleTheme {
    accent: "#5D3F6A",
    icon: "👤",
    title: "Welcome Back",
    subtitle: "Sign in to manage your bookings",
    label: "Customer Login",
    demo_email: "customer@example.com",
    demo_password: "customer123",
};

const STAFF_THEME: RoleTheme = RoleTheme {
    accent: "#2C2C2C",
    icon: "👷",
    title: "Staff Portal",
    subtitle: "Access your schedule and jobs",
    label: "Staff Access",
    demo_email: "staff@example.com",
    demo_password: "staff123",
};

const ADMIN_THEME: RoleTheme = RoleTheme {
    accent: "#1E293B",
    icon: "⚙️",
    title: "Admin System",
    subtitle: "Manage platform and users",
    label: "Admin Portal",
    demo_email: "admin@example.com",
    demo_password: "admin123",
};

pub fn role_theme(role: Role) -> &'static RoleTheme {
    match role {
        Role::Customer => &CUSTOMER_THEME,
        Role::Staff => &STAFF_THEME,
        Role::Admin => &ADMIN_THEME,
    }
}

pub(crate) const CHOOSER_TITLE: &str = "Welcome to NCL";
pub(crate) const CHOOSER_SUBTITLE: &str = "Professional home services at your fingertips";
