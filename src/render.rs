use super::*;

pub(crate) const HELP_MESSAGE: &str = "Help: Contact support for login assistance";

/// Rebuilds the surface content for the given view. Clears first, so
/// rendering the same descriptor twice leaves equivalent visible state.
/// Never navigates; navigation only happens through activated bindings.
pub(crate) fn render_view(
    engine: &mut FallbackEngine,
    page: &mut HostPage,
    surface: NodeId,
    descriptor: ViewDescriptor,
) -> Result<()> {
    clear_surface(engine, page, surface);
    match descriptor {
        ViewDescriptor::Chooser => render_chooser(engine, page, surface),
        ViewDescriptor::Login(role) => render_login(engine, page, surface, role),
    }
    page.trace_render_line(format!(
        "[render] view={descriptor:?} path={}",
        page.pathname
    ));
    Ok(())
}

fn render_chooser(engine: &mut FallbackEngine, page: &mut HostPage, surface: NodeId) {
    let panel = page.dom.create_element(
        surface,
        "div",
        &[(
            "style",
            "max-width:450px;margin:40px auto;background:white;border-radius:24px;padding:32px",
        )],
    );

    let title = page
        .dom
        .create_element(panel, "h2", &[("id", "fallback-title")]);
    page.dom.create_text(title, CHOOSER_TITLE);
    let subtitle = page
        .dom
        .create_element(panel, "p", &[("id", "fallback-subtitle")]);
    page.dom.create_text(subtitle, CHOOSER_SUBTITLE);

    for role in Role::ALL {
        let theme = role_theme(role);
        let style = format!(
            "width:100%;padding:16px;background:{};color:white;border-radius:12px",
            theme.accent
        );
        let id = format!("choose-{}", role.segment());
        let button = page
            .dom
            .create_element(panel, "button", &[("id", &id), ("style", &style)]);
        page.dom.create_text(button, theme.icon);
        page.dom.create_text(button, " ");
        page.dom.create_text(button, theme.label);
        engine
            .bindings
            .insert(button, Action::Navigate(format!("/login/{}", role.segment())));
    }

    let help = page
        .dom
        .create_element(panel, "button", &[("id", "fallback-help")]);
    page.dom.create_text(help, "Need help?");
    engine.bindings.insert(help, Action::ShowHelp);
}

fn render_login(engine: &mut FallbackEngine, page: &mut HostPage, surface: NodeId, role: Role) {
    let theme = role_theme(role);
    let panel_style = format!(
        "max-width:400px;margin:40px auto;background:linear-gradient(to bottom,{}15,white);border-radius:20px;padding:32px",
        theme.accent
    );
    let panel = page
        .dom
        .create_element(surface, "div", &[("style", &panel_style)]);

    let back = page
        .dom
        .create_element(panel, "button", &[("id", "login-back")]);
    page.dom.create_text(back, "←");
    engine.bindings.insert(back, Action::Navigate("/".into()));

    let header = page.dom.create_element(panel, "div", &[]);
    let icon = page
        .dom
        .create_element(header, "span", &[("id", "fallback-icon")]);
    page.dom.create_text(icon, theme.icon);
    let title = page
        .dom
        .create_element(header, "h2", &[("id", "fallback-title")]);
    page.dom.create_text(title, theme.title);
    let subtitle = page
        .dom
        .create_element(header, "p", &[("id", "fallback-subtitle")]);
    page.dom.create_text(subtitle, theme.subtitle);

    let form = page
        .dom
        .create_element(panel, "form", &[("id", "fallback-login-form")]);
    engine.bindings.insert(form, Action::SubmitLogin(role));

    let email_label = page.dom.create_element(form, "label", &[]);
    page.dom.create_text(email_label, "Email Address");
    page.dom.create_element(
        form,
        "input",
        &[
            ("id", "fallback-email"),
            ("type", "email"),
            ("placeholder", "Enter your email"),
            ("required", ""),
        ],
    );

    let password_label = page.dom.create_element(form, "label", &[]);
    page.dom.create_text(password_label, "Password");
    page.dom.create_element(
        form,
        "input",
        &[
            ("id", "fallback-password"),
            ("type", "password"),
            ("placeholder", "Enter your password"),
            ("required", ""),
        ],
    );

    let submit_style = format!(
        "width:100%;padding:14px;background:{};color:white;border-radius:8px",
        theme.accent
    );
    let submit = page.dom.create_element(
        form,
        "button",
        &[
            ("id", "fallback-submit"),
            ("type", "submit"),
            ("style", &submit_style),
        ],
    );
    page.dom.create_text(submit, "Sign In");

    // Account management links exist for customers only; staff and admin
    // accounts are provisioned by the platform.
    if role == Role::Customer {
        let links = page.dom.create_element(form, "div", &[]);
        let forgot = page
            .dom
            .create_element(links, "a", &[("id", "forgot-password-link"), ("href", "#")]);
        page.dom.create_text(forgot, "Forgot Password?");
        engine
            .bindings
            .insert(forgot, Action::Navigate("/forgot-password".into()));
        let register = page
            .dom
            .create_element(links, "a", &[("id", "create-account-link"), ("href", "#")]);
        page.dom.create_text(register, "Create Account");
        engine
            .bindings
            .insert(register, Action::Navigate("/register/customer".into()));
    }

    let demo_style = format!(
        "background:{}0D;border:1px solid {}33;border-radius:12px;padding:16px",
        theme.accent, theme.accent
    );
    let demo = page
        .dom
        .create_element(panel, "div", &[("style", &demo_style)]);
    let demo_heading = page.dom.create_element(demo, "span", &[]);
    page.dom.create_text(demo_heading, "Demo Credentials");

    let demo_email = page
        .dom
        .create_element(demo, "div", &[("id", "demo-email")]);
    page.dom.create_text(demo_email, theme.demo_email);
    engine
        .bindings
        .insert(demo_email, Action::FillDemoEmail(role));

    let demo_password = page
        .dom
        .create_element(demo, "div", &[("id", "demo-password")]);
    page.dom.create_text(demo_password, theme.demo_password);
    engine
        .bindings
        .insert(demo_password, Action::FillDemoPassword(role));

    let hint = page.dom.create_element(demo, "div", &[]);
    page.dom.create_text(hint, "Tap on credentials to auto-fill");
}
