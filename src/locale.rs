use std::{borrow::Cow, collections::HashMap, str::FromStr, sync::LazyLock};

use fluent_templates::{fluent_bundle::FluentValue, LanguageIdentifier, Loader};

fluent_templates::static_loader! {
    static LOCALES = {
        locales: "locales",
        fallback_language: "en-US",
        core_locales: "locales/core.ftl",
    };
}

fn current_lang_id() -> &'static LanguageIdentifier {
    static LANG_ID: LazyLock<LanguageIdentifier> = LazyLock::new(|| {
        let locale_string = sys_locale::get_locale().unwrap_or_else(|| "en-US".to_string());

        match LanguageIdentifier::from_str(&locale_string) {
            Ok(value) => value,
            Err(_) => fluent_templates::langid!("en-US"),
        }
    });

    &LANG_ID
}

/// Looks up user-facing text in the bundled translations.
#[derive(Debug, Clone)]
pub struct Locale {
    lang_id: LanguageIdentifier,
}

impl Locale {
    pub fn with_system() -> Self {
        Self {
            lang_id: current_lang_id().clone(),
        }
    }

    pub fn text(&self, text_id: &str) -> String {
        LOCALES.lookup(&self.lang_id, text_id)
    }

    pub fn text_args(&self, text_id: &str, args: &[(&'static str, &str)]) -> String {
        let args: HashMap<Cow<'static, str>, FluentValue<'static>> = args
            .iter()
            .map(|(key, value)| (Cow::Borrowed(*key), FluentValue::from(value.to_string())))
            .collect();

        LOCALES.lookup_with_args(&self.lang_id, text_id, &args)
    }
}
