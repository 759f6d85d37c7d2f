use crate::loader::PageLoadState;

/// The only action an error panel offers: start the page over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Reload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View<'a, T> {
    Spinner { label: String },
    ErrorPanel { message: &'a str, action: ViewAction },
    Content(&'a T),
}

/// Pure mapping from page state to what should be on screen.
pub fn view<'a, T>(resource: &str, state: &'a PageLoadState<T>) -> View<'a, T> {
    match state {
        PageLoadState::Loading => View::Spinner {
            label: format!("Loading {resource}..."),
        },
        PageLoadState::Failed(message) => View::ErrorPanel {
            message,
            action: ViewAction::Reload,
        },
        PageLoadState::Loaded(data) => View::Content(data),
    }
}

/// Render a view as terminal text, delegating loaded content to `content`.
pub fn render_text<T>(view: &View<'_, T>, content: impl FnOnce(&T) -> String) -> String {
    match view {
        View::Spinner { label } => format!("⏳ {label}"),
        View::ErrorPanel { message, action } => {
            let hint = match action {
                ViewAction::Reload => "Run the command again to retry.",
            };
            format!("✖ {message}\n  {hint}")
        }
        View::Content(data) => content(data),
    }
}
