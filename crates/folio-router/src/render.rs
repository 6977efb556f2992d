//! Error presentations
//!
//! Not-found and network failures are rendered as ordinary content: a block
//! with a distinguishing modifier class, a localized title and message, and
//! a link back to the default view.

use folio_fragments::ViewName;
use serde::{Deserialize, Serialize};

use crate::state::RenderOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
        }
    }

    fn not_found_title(&self) -> &'static str {
        match self {
            Locale::Es => "⚠️ Vista no encontrada",
            Locale::En => "⚠️ View not found",
        }
    }

    fn not_found_message(&self, view: &str) -> String {
        match self {
            Locale::Es => format!("La página \"{}\" no existe o no se pudo cargar.", view),
            Locale::En => format!("The page \"{}\" does not exist or could not be loaded.", view),
        }
    }

    fn network_title(&self) -> &'static str {
        match self {
            Locale::Es => "❌ Error de conexión",
            Locale::En => "❌ Connection error",
        }
    }

    fn network_message(&self) -> &'static str {
        match self {
            Locale::Es => {
                "Hubo un problema al cargar el contenido. Por favor, verifica tu conexión."
            }
            Locale::En => "There was a problem loading the content. Please check your connection.",
        }
    }

    fn back_label(&self) -> &'static str {
        match self {
            Locale::Es => "Volver al inicio",
            Locale::En => "Back to home",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            _ => Err(format!("Unknown locale: {}", s)),
        }
    }
}

/// Markup for a failed view. `Loaded` has no error block and renders as the
/// network error, which is the fallback for anything unexpected.
pub fn error_block(
    outcome: RenderOutcome,
    view: &ViewName,
    default_view: &ViewName,
    locale: Locale,
) -> String {
    let (modifier, title, message) = match outcome {
        RenderOutcome::NotFound => (
            "error-container--not-found",
            locale.not_found_title(),
            locale.not_found_message(&escape_html(view.as_str())),
        ),
        RenderOutcome::NetworkError | RenderOutcome::Loaded => (
            "error-container--network-error",
            locale.network_title(),
            locale.network_message().to_string(),
        ),
    };

    let home = escape_html(default_view.as_str());

    format!(
        concat!(
            "<div class=\"error-container {modifier}\">\n",
            "    <h2 class=\"error-container__title\">{title}</h2>\n",
            "    <p class=\"error-container__message\">{message}</p>\n",
            "    <a href=\"#/{home}\" class=\"btn btn--primary\" data-view=\"{home}\">{back}</a>\n",
            "</div>\n"
        ),
        modifier = modifier,
        title = title,
        message = message,
        home = home,
        back = locale.back_label(),
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
