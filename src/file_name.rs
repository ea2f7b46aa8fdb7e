use crate::output_type::OutputType;

const FALLBACK_STEM: &str = "captions";

/// Build a file-system-safe name for a transcoded caption file.
///
/// The title keeps only alphanumerics, spaces, `_` and `-`; spaces and `-` then become `_`.
/// The language code is sanitized the same way and appended, followed by the format's
/// extension: `("My Video!", "en", Srt)` → `My_Video_en.srt`.
pub fn caption_file_name(title: &str, language_code: &str, output_type: OutputType) -> String {
    let mut stem = sanitize(title);
    if stem.is_empty() {
        stem.push_str(FALLBACK_STEM);
    }

    let language = sanitize(language_code);
    if !language.is_empty() {
        stem.push('_');
        stem.push_str(&language);
    }

    format!("{stem}.{}", output_type.extension())
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .map(|c| if matches!(c, ' ' | '-') { '_' } else { c })
        .collect()
}
