use std::time::Duration;

use tracing::{error, info};

use crate::clock::Delay;
use crate::models::{DisplayMessage, ReviewRecord, StoreKind};
use crate::translate::Translator;

/// Separator line appended to every posted review
pub const SEPARATOR: &str = "----------------------------------";

/// Pause before each translation request, to stay polite with the endpoint
const TRANSLATE_PACING: Duration = Duration::from_secs(1);

/// Presentation options for one scope
#[derive(Debug, Clone)]
pub struct Presentation {
    /// Flag emoji shown next to the author line
    pub flag: String,
    /// Locale the reviews are written in, e.g. "en_US"
    pub language: String,
    /// Whether to post a machine-translated follow-up
    pub translate: bool,
}

impl Presentation {
    /// Two-letter language code sent to the translation endpoint
    fn source_lang(&self) -> &str {
        self.language.get(..2).unwrap_or(&self.language)
    }
}

/// Render a rating as exactly five glyph slots, filled then empty.
/// Out-of-range input is clamped rather than rejected.
pub fn render_stars(star_rating: i64) -> String {
    let filled = star_rating.clamp(0, 5) as usize;
    let mut stars = String::new();
    for slot in 0..5 {
        stars.push(if slot < filled { '★' } else { '☆' });
        stars.push(' ');
    }
    stars
}

/// The Play Store feed prefixes review bodies with a control character;
/// drop the first character the way the display expects.
fn strip_leading_char(text: &str) -> &str {
    let mut indices = text.char_indices();
    indices.next();
    match indices.next() {
        Some((i, _)) => &text[i..],
        None => "",
    }
}

/// Build the displayable message (and its optional translated follow-up) for
/// one review. Translation failures never propagate; the follow-up degrades
/// to a placeholder naming the source language.
pub async fn build_message<T, D>(
    record: &ReviewRecord,
    kind: StoreKind,
    presentation: &Presentation,
    translator: &T,
    delay: &D,
) -> DisplayMessage
where
    T: Translator + ?Sized,
    D: Delay + ?Sized,
{
    let stars = render_stars(record.star_rating);

    let (text, translated) = if kind.is_apple_family() {
        let title = record.title.as_deref().unwrap_or("");
        let text = format!(
            "_{} | {}_\n{} _by {}_ {}\n*{}*\n{}\n{}",
            record.date,
            record.version,
            stars,
            record.author,
            presentation.flag,
            title,
            record.body,
            SEPARATOR
        );

        let translated = if presentation.translate {
            let lang = presentation.source_lang();
            let title_translation =
                translate_or_placeholder(translator, delay, title, lang, "title").await;
            let body_translation =
                translate_or_placeholder(translator, delay, &record.body, lang, "review").await;
            Some(format!("{} | {}", title_translation, body_translation))
        } else {
            None
        };

        (text, translated)
    } else {
        let body = strip_leading_char(&record.body);
        let text = format!(
            "_{} | {}_\n{} _by {}_ {}\n{}\n{}",
            record.date, record.version, stars, record.author, presentation.flag, body, SEPARATOR
        );

        let translated = if presentation.translate {
            let lang = presentation.source_lang();
            Some(translate_or_placeholder(translator, delay, body, lang, "review").await)
        } else {
            None
        };

        (text, translated)
    };

    DisplayMessage { text, translated }
}

async fn translate_or_placeholder<T, D>(
    translator: &T,
    delay: &D,
    text: &str,
    source_lang: &str,
    what: &str,
) -> String
where
    T: Translator + ?Sized,
    D: Delay + ?Sized,
{
    info!(what, source_lang, "Translating");
    delay.sleep(TRANSLATE_PACING).await;

    match translator.translate(text, source_lang).await {
        Ok(translated) => translated,
        Err(e) => {
            error!(error = %e, what, "Translation failed, using placeholder");
            e.placeholder(source_lang)
        }
    }
}
