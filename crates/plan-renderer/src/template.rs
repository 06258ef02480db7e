//! Page shell and token substitution.
//!
//! A template is an HTML document containing `{{token}}` placeholders and
//! exactly one `{{content}}` marker where the rendered fragment goes.
//!
//! | Token | Value |
//! |---|---|
//! | `{{username}}` | login name |
//! | `{{fullname}}` | display name |
//! | `{{directory}}` | home directory |
//! | `{{shell}}` | login shell |
//! | `{{title}}` | site title |
//! | `{{onSince}}` | creation time, `Mon Jan _2 15:04 (TZ)` |
//! | `{{modTimeUnix}}` | update time as Unix seconds |

use crate::RenderError;

/// Required content marker.
pub const CONTENT_MARKER: &str = "{{content}}";

const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.html");

/// Script that reloads the page when the preview server signals a rebuild.
pub const LIVE_RELOAD_SCRIPT: &str = r#"<script>
(() => {
  const events = new EventSource("/events");
  events.onmessage = (event) => {
    if (event.data === "reload") {
      events.close();
      window.location.reload();
    }
  };
})();
</script>
"#;

/// Token values substituted into the page shell.
#[derive(Debug, Default)]
pub struct Tokens<'a> {
    pub username: &'a str,
    pub fullname: &'a str,
    pub directory: &'a str,
    pub shell: &'a str,
    pub title: &'a str,
    pub on_since: &'a str,
    pub mod_time_unix: i64,
}

impl Tokens<'_> {
    /// Replace every known token in `text`. Values are HTML-escaped.
    fn apply(&self, text: &str) -> String {
        text.replace("{{username}}", &escape(self.username))
            .replace("{{fullname}}", &escape(self.fullname))
            .replace("{{directory}}", &escape(self.directory))
            .replace("{{shell}}", &escape(self.shell))
            .replace("{{title}}", &escape(self.title))
            .replace("{{onSince}}", &escape(self.on_since))
            .replace("{{modTimeUnix}}", &self.mod_time_unix.to_string())
    }
}

/// Page shell, either embedded or loaded from the plan directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    source: String,
    custom: bool,
}

impl Default for Template {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Template {
    /// The built-in template.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_owned(),
            custom: false,
        }
    }

    /// A user-supplied template.
    #[must_use]
    pub fn custom(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            custom: true,
        }
    }

    /// Custom template when present, embedded otherwise.
    #[must_use]
    pub fn from_custom(source: Option<String>) -> Self {
        source.map_or_else(Self::embedded, Self::custom)
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check that the content marker occurs exactly once.
    pub fn validate(&self) -> Result<(), RenderError> {
        self.split().map(|_| ())
    }

    fn split(&self) -> Result<(&str, &str), RenderError> {
        let found = self.source.matches(CONTENT_MARKER).count();
        if found != 1 {
            return Err(RenderError::MissingMarker { found });
        }
        self.source
            .split_once(CONTENT_MARKER)
            .ok_or(RenderError::MissingMarker { found: 0 })
    }

    /// Substitute tokens and insert `fragment` at the content marker.
    ///
    /// Tokens are replaced in the shell only, never inside the fragment.
    /// With `live_reload`, the reload script goes before the last `</body>`,
    /// or at the end if there is none.
    pub fn fill(
        &self,
        tokens: &Tokens<'_>,
        fragment: &str,
        live_reload: bool,
    ) -> Result<String, RenderError> {
        let (head, tail) = self.split()?;
        let head = tokens.apply(head);
        let mut tail = tokens.apply(tail);

        if live_reload {
            match tail.rfind("</body>") {
                Some(pos) => tail.insert_str(pos, LIVE_RELOAD_SCRIPT),
                None => tail.push_str(LIVE_RELOAD_SCRIPT),
            }
        }

        let mut page = String::with_capacity(head.len() + fragment.len() + tail.len());
        page.push_str(&head);
        page.push_str(fragment);
        page.push_str(&tail);
        Ok(page)
    }
}

/// Escape text for HTML content and attribute values.
pub(crate) fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
