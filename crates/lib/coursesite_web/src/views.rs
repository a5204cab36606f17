//! HTML pages.
//!
//! Every page is assembled from [`shell`] with maud, which escapes every
//! interpolated value. Rendered markdown and HTML fragments are the only
//! markup inserted as [`PreEscaped`].

use maud::{DOCTYPE, Markup, PreEscaped, html};

use coursesite_core::models::account::{Account, SessionClaims};
use coursesite_core::site::NavItem;
use coursesite_core::site::listing::ListingEntry;

const STYLE: &str = r#"
body { font-family: system-ui, -apple-system, sans-serif; margin: 0; color: #222; line-height: 1.6; }
header { background: #1e3a5f; color: #fff; padding: 0.6rem 1.5rem; display: flex; gap: 1rem; align-items: center; flex-wrap: wrap; }
header a { color: #fff; text-decoration: none; }
header a:hover { text-decoration: underline; }
header .account { margin-left: auto; display: flex; gap: 0.8rem; align-items: center; }
header form { display: inline; margin: 0; }
header button { background: none; border: 1px solid #fff; color: #fff; border-radius: 4px; cursor: pointer; }
main { max-width: 860px; margin: 1.5rem auto; padding: 0 1.5rem; }
.card { max-width: 420px; margin: 3rem auto; padding: 2rem; border: 1px solid #ddd; border-radius: 8px; }
label { display: block; margin-top: 0.8rem; }
input[type=email], input[type=password], textarea { width: 100%; padding: 0.4rem; box-sizing: border-box; }
button[type=submit] { margin-top: 1rem; padding: 0.5rem 1.2rem; }
.error { background: #fdecea; color: #a12622; padding: 0.6rem; border-radius: 4px; }
.success { background: #e7f6ec; color: #1d6b3a; padding: 0.6rem; border-radius: 4px; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: 0.4rem; text-align: left; }
ul.listing { list-style: none; padding: 0; }
ul.listing li { padding: 0.3rem 0; border-bottom: 1px solid #eee; }
pre { background: #f6f8fa; padding: 0.8rem; overflow-x: auto; }
"#;

fn shell(title: &str, header: Markup, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                (header)
                main { (body) }
            }
        }
    }
    .into_string()
}

fn header(nav: &[NavItem], user: Option<&SessionClaims>) -> Markup {
    html! {
        header {
            nav {
                @for item in nav {
                    a href=(item.url) { (item.name) }
                    " "
                }
            }
            @if let Some(user) = user {
                div.account {
                    @if user.is_admin {
                        a href="/admin/add-users" { "Add users" }
                        a href="/admin/manage-users" { "Manage users" }
                    }
                    span { (user.email) }
                    a href="/change-password" { "Change password" }
                    form method="post" action="/logout" {
                        button type="submit" { "Log out" }
                    }
                }
            }
        }
    }
}

fn messages(error: Option<&str>, success: Option<&str>) -> Markup {
    html! {
        @if let Some(error) = error {
            p.error { (error) }
        }
        @if let Some(success) = success {
            p.success { (success) }
        }
    }
}

/// A content page: rendered markdown or an HTML fragment.
pub fn content_page(
    title: &str,
    nav: &[NavItem],
    user: Option<&SessionClaims>,
    content_html: &str,
) -> String {
    shell(title, header(nav, user), PreEscaped(content_html.to_string()))
}

/// A collection listing, preceded by the collection's own index document.
pub fn listing_page(
    title: &str,
    nav: &[NavItem],
    user: Option<&SessionClaims>,
    intro_html: &str,
    entries: &[ListingEntry],
) -> String {
    let body = html! {
        (PreEscaped(intro_html))
        ul.listing {
            @for entry in entries {
                li { a href=(entry.url) { (entry.display_name) } }
            }
        }
    };
    shell(title, header(nav, user), body)
}

pub fn login_page(error: Option<&str>, email: &str) -> String {
    let body = html! {
        div.card {
            h1 { "Log in" }
            (messages(error, None))
            form method="post" action="/login" {
                label for="email" { "Email" }
                input type="email" id="email" name="email" value=(email) required autofocus;
                label for="password" { "Password" }
                input type="password" id="password" name="password" required;
                button type="submit" { "Log in" }
            }
        }
    };
    shell("Log in", html! {}, body)
}

/// What the setup page shows.
pub enum SetupView<'a> {
    /// Password form for a valid token.
    Form {
        token: &'a str,
        email: &'a str,
        error: Option<&'a str>,
    },
    /// Unknown, expired or already used token: message only.
    Invalid,
}

const INVALID_SETUP_LINK: &str =
    "This setup link is invalid or has expired. Ask your instructor to send a new one.";

pub fn setup_page(view: SetupView<'_>) -> String {
    let body = match view {
        SetupView::Form {
            token,
            email,
            error,
        } => html! {
            div.card {
                h1 { "Set up your account" }
                p { "Choose a password for " strong { (email) } "." }
                (messages(error, None))
                form method="post" action=(format!("/setup?token={token}")) {
                    input type="hidden" name="token" value=(token);
                    label for="password" { "Password (at least 8 characters)" }
                    input type="password"
                        id="password"
                        name="password"
                        minlength="8"
                        required
                        autofocus;
                    label for="confirm_password" { "Confirm password" }
                    input type="password"
                        id="confirm_password"
                        name="confirm_password"
                        minlength="8"
                        required;
                    button type="submit" { "Set password" }
                }
            }
        },
        SetupView::Invalid => html! {
            div.card {
                h1 { "Set up your account" }
                (messages(Some(INVALID_SETUP_LINK), None))
            }
        },
    };
    shell("Account setup", html! {}, body)
}

pub fn change_password_page(
    nav: &[NavItem],
    user: Option<&SessionClaims>,
    error: Option<&str>,
    success: Option<&str>,
) -> String {
    let body = html! {
        div.card {
            h1 { "Change password" }
            (messages(error, success))
            form method="post" action="/change-password" {
                label for="current_password" { "Current password" }
                input type="password" id="current_password" name="current_password" required;
                label for="new_password" { "New password (at least 8 characters)" }
                input type="password" id="new_password" name="new_password" minlength="8" required;
                label for="confirm_password" { "Confirm new password" }
                input type="password"
                    id="confirm_password"
                    name="confirm_password"
                    minlength="8"
                    required;
                button type="submit" { "Change password" }
            }
        }
    };
    shell("Change password", header(nav, user), body)
}

pub fn add_users_page(
    nav: &[NavItem],
    user: Option<&SessionClaims>,
    error: Option<&str>,
    success: Option<&str>,
) -> String {
    let body = html! {
        h1 { "Add users" }
        (messages(error, success))
        h2 { "Single user" }
        form method="post" action="/admin/add-users" {
            input type="hidden" name="type" value="single";
            label for="email" { "Email" }
            input type="email" id="email" name="email" required;
            label { input type="checkbox" name="is_admin"; " Administrator" }
            button type="submit" { "Add user" }
        }
        h2 { "Bulk add" }
        form method="post" action="/admin/add-users" {
            input type="hidden" name="type" value="bulk";
            label for="emails" { "Email addresses, one per line" }
            textarea id="emails" name="emails" rows="10" required {}
            label { input type="checkbox" name="bulk_admin"; " Administrators" }
            button type="submit" { "Add users" }
        }
    };
    shell("Add users", header(nav, user), body)
}

/// Account totals shown above the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountStats {
    pub total: usize,
    pub setup: usize,
    pub pending: usize,
}

impl AccountStats {
    pub fn of(accounts: &[Account]) -> Self {
        let setup = accounts.iter().filter(|a| a.is_setup).count();
        Self {
            total: accounts.len(),
            setup,
            pending: accounts.len() - setup,
        }
    }
}

pub fn manage_users_page(
    nav: &[NavItem],
    user: Option<&SessionClaims>,
    accounts: &[Account],
    success: Option<&str>,
) -> String {
    let stats = AccountStats::of(accounts);
    let body = html! {
        h1 { "Manage users" }
        (messages(None, success))
        p {
            "Total: " (stats.total)
            " · Set up: " (stats.setup)
            " · Pending: " (stats.pending)
        }
        table {
            thead {
                tr { th { "Email" } th { "Role" } th { "Status" } th { "Created" } th {} }
            }
            tbody {
                @for account in accounts {
                    tr {
                        td { (account.email) }
                        td { (if account.is_admin { "Admin" } else { "User" }) }
                        td { (if account.is_setup { "Set up" } else { "Pending" }) }
                        td { (account.created_at.format("%Y-%m-%d %H:%M").to_string()) }
                        td {
                            @if account.is_pending() {
                                form method="post" action="/admin/resend-setup-email" {
                                    input type="hidden" name="user_id" value=(account.id);
                                    button type="submit" { "Resend setup email" }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    shell("Manage users", header(nav, user), body)
}

/// Standalone error page.
pub fn error_page(title: &str, message: &str) -> String {
    let body = html! {
        div.card {
            h1 { (title) }
            p { (message) }
            p { a href="/" { "Back to the home page" } }
        }
    };
    shell(title, html! {}, body)
}
