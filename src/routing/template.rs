//! Default-target template rendering.
//!
//! The default target is configured as a format string such as
//! `https://svc-{0}.internal/api`, where `{0}` stands for the deployment
//! stage. `{{` and `}}` produce literal braces. Anything else inside braces is
//! rejected so that a broken template stops the process at startup instead of
//! producing a bogus URI.

use thiserror::Error;

/// Error produced when a template cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' at byte {position}")]
    Unclosed { position: usize },

    #[error("unmatched '}}' at byte {position}")]
    UnmatchedClose { position: usize },

    #[error("unknown placeholder '{{{placeholder}}}' at byte {position}, only {{0}} is supported")]
    UnknownPlaceholder { placeholder: String, position: usize },
}

/// Render `template`, replacing every `{0}` with `stage`.
pub fn render(template: &str, stage: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + stage.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, inner)) => placeholder.push(inner),
                        None => return Err(TemplateError::Unclosed { position }),
                    }
                }

                if placeholder != "0" {
                    return Err(TemplateError::UnknownPlaceholder {
                        placeholder,
                        position,
                    });
                }
                out.push_str(stage);
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(TemplateError::UnmatchedClose { position });
                }
                out.push('}');
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
