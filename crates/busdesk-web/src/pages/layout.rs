//! Page shell, toasts and the confirmation panel

use super::list_page::{Confirmation, Notice};
use crate::components::html::HiddenFields;
use busdesk_core::AdminResource;
use leptos::prelude::*;

/// `action` value that runs the staged bulk action
pub const CONFIRM: &str = "confirm";
/// `action` value that drops the staged bulk action
pub const CANCEL: &str = "cancel";
/// Field carrying the staged bulk command through the confirmation form
pub const PENDING_FIELD: &str = "pending";

/// Document shell with the resource sidebar
#[component]
pub fn Layout(
    /// Page heading
    title: String,
    /// Main content
    children: Children,
) -> impl IntoView {
    let head_title = format!("{title} | busdesk admin");
    let nav = AdminResource::ALL
        .iter()
        .map(|resource| {
            let href = format!("/admin/{}", resource.as_segment());
            view! { <a href=href>{resource.title()}</a> }
        })
        .collect::<Vec<_>>();

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <title>{head_title}</title>
            </head>
            <body>
                <nav class="sidebar">{nav}</nav>
                <main>
                    <h1>{title}</h1>
                    {children()}
                </main>
            </body>
        </html>
    }
}

/// Toasts for the queued notices
#[component]
pub fn Notices(
    /// Notices to show
    notices: Vec<Notice>,
) -> impl IntoView {
    notices
        .into_iter()
        .map(|notice| {
            let class = format!("toast toast-{}", notice.level.as_class());
            view! { <div class=class role="alert">{notice.message}</div> }
        })
        .collect::<Vec<_>>()
}

/// Confirm or cancel a staged bulk action
#[component]
pub fn ConfirmPanel(
    /// Staged action
    pending: Confirmation,
    /// Resource the action applies to
    resource: AdminResource,
    /// Target of the form
    action: String,
    /// Query fields to carry through
    state: Vec<(String, String)>,
) -> impl IntoView {
    let prompt = pending.prompt(resource);
    let mut fields = state;
    fields.extend(
        pending
            .ids()
            .iter()
            .map(|id| ("selected".to_string(), id.clone())),
    );
    fields.push((PENDING_FIELD.to_string(), pending.command().to_string()));

    view! {
        <form class="confirm-panel" method="post" action=action>
            <p class="confirm-prompt">{prompt}</p>
            <HiddenFields pairs=fields/>
            <button type="submit" name="action" value=CONFIRM class="danger">"Confirm"</button>
            <button type="submit" name="action" value=CANCEL>"Cancel"</button>
        </form>
    }
}

/// Render `body` inside the page shell
pub fn render_document<V>(title: &str, body: V) -> String
where
    V: IntoView + Send + 'static,
{
    let title = title.to_string();
    view! { <Layout title=title>{body}</Layout> }.to_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::NoticeLevel;

    #[test]
    fn test_document_has_title_and_sidebar() {
        let html = render_document("Routes", view! { <p>"hello"</p> });

        assert!(html.starts_with("<!DOCTYPE html>"), "{html}");
        assert!(html.contains("<title>Routes | busdesk admin</title>"));
        assert!(html.contains(r#"href="/admin/bus-types""#));
        assert!(html.contains("<p>hello</p>"));
    }

    #[test]
    fn test_notices_are_escaped() {
        let notices = vec![Notice {
            level: NoticeLevel::Error,
            message: "<b>down</b>".to_string(),
        }];
        let html = view! { <Notices notices=notices/> }.to_html();

        assert!(html.contains(r#"<div class="toast toast-error" role="alert">"#), "{html}");
        assert!(html.contains("&lt;b&gt;down&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_confirm_panel_carries_ids_and_command() {
        let pending = Confirmation::ChangeStatus {
            ids: vec!["r1".to_string(), "r2".to_string()],
            status: "inactive".to_string(),
        };
        let state = vec![("page".to_string(), "2".to_string())];
        let html = view! {
            <ConfirmPanel
                pending=pending
                resource=AdminResource::Routes
                action="/admin/routes/bulk".to_string()
                state=state
            />
        }
        .to_html();

        assert!(html.contains("Mark 2 routes as inactive?"));
        assert!(html.contains(r#"name="page" value="2""#));
        assert!(html.contains(r#"name="selected" value="r1""#));
        assert!(html.contains(r#"name="selected" value="r2""#));
        assert!(html.contains(r#"name="pending" value="status:inactive""#));
        assert!(html.contains(r#"value="confirm""#));
        assert!(html.contains(r#"value="cancel""#));
    }
}
