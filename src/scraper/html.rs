//! Minimal HTML text extraction for tutorial pages.

use regex::Regex;
use std::sync::OnceLock;

/// Shortest block text considered a real paragraph.
pub const MIN_PARAGRAPH_CHARS: usize = 80;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*?(/?)>")
            .expect("static tag pattern")
    })
}

fn entity_regex() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").expect("static entity pattern"))
}

/// Named entities decoded besides numeric references. `nbsp` becomes a
/// plain space.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", ' '),
    ("ensp", '\u{2002}'),
    ("emsp", '\u{2003}'),
    ("thinsp", '\u{2009}'),
    ("shy", '\u{00AD}'),
    ("zwnj", '\u{200C}'),
    ("zwj", '\u{200D}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("sbquo", '\u{201A}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
    ("bdquo", '\u{201E}'),
    ("laquo", '\u{00AB}'),
    ("raquo", '\u{00BB}'),
    ("lsaquo", '\u{2039}'),
    ("rsaquo", '\u{203A}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("hellip", '\u{2026}'),
    ("bull", '\u{2022}'),
    ("middot", '\u{00B7}'),
    ("prime", '\u{2032}'),
    ("Prime", '\u{2033}'),
    ("dagger", '\u{2020}'),
    ("Dagger", '\u{2021}'),
    ("sect", '\u{00A7}'),
    ("para", '\u{00B6}'),
    ("copy", '\u{00A9}'),
    ("reg", '\u{00AE}'),
    ("trade", '\u{2122}'),
    ("deg", '\u{00B0}'),
    ("cent", '\u{00A2}'),
    ("pound", '\u{00A3}'),
    ("euro", '\u{20AC}'),
    ("yen", '\u{00A5}'),
    ("iexcl", '\u{00A1}'),
    ("iquest", '\u{00BF}'),
    ("times", '\u{00D7}'),
    ("divide", '\u{00F7}'),
    ("plusmn", '\u{00B1}'),
    ("minus", '\u{2212}'),
    ("lowast", '\u{2217}'),
    ("sdot", '\u{22C5}'),
    ("frac12", '\u{00BD}'),
    ("frac14", '\u{00BC}'),
    ("frac34", '\u{00BE}'),
    ("sup1", '\u{00B9}'),
    ("sup2", '\u{00B2}'),
    ("sup3", '\u{00B3}'),
    ("le", '\u{2264}'),
    ("ge", '\u{2265}'),
    ("ne", '\u{2260}'),
    ("asymp", '\u{2248}'),
    ("equiv", '\u{2261}'),
    ("sim", '\u{223C}'),
    ("infin", '\u{221E}'),
    ("sum", '\u{2211}'),
    ("prod", '\u{220F}'),
    ("radic", '\u{221A}'),
    ("part", '\u{2202}'),
    ("nabla", '\u{2207}'),
    ("int", '\u{222B}'),
    ("forall", '\u{2200}'),
    ("exist", '\u{2203}'),
    ("empty", '\u{2205}'),
    ("isin", '\u{2208}'),
    ("notin", '\u{2209}'),
    ("ni", '\u{220B}'),
    ("cap", '\u{2229}'),
    ("cup", '\u{222A}'),
    ("sub", '\u{2282}'),
    ("sup", '\u{2283}'),
    ("sube", '\u{2286}'),
    ("supe", '\u{2287}'),
    ("and", '\u{2227}'),
    ("or", '\u{2228}'),
    ("not", '\u{00AC}'),
    ("lceil", '\u{2308}'),
    ("rceil", '\u{2309}'),
    ("lfloor", '\u{230A}'),
    ("rfloor", '\u{230B}'),
    ("lang", '\u{27E8}'),
    ("rang", '\u{27E9}'),
    ("larr", '\u{2190}'),
    ("uarr", '\u{2191}'),
    ("rarr", '\u{2192}'),
    ("darr", '\u{2193}'),
    ("harr", '\u{2194}'),
    ("lArr", '\u{21D0}'),
    ("rArr", '\u{21D2}'),
    ("hArr", '\u{21D4}'),
    ("alpha", '\u{03B1}'),
    ("beta", '\u{03B2}'),
    ("gamma", '\u{03B3}'),
    ("delta", '\u{03B4}'),
    ("epsilon", '\u{03B5}'),
    ("theta", '\u{03B8}'),
    ("lambda", '\u{03BB}'),
    ("mu", '\u{03BC}'),
    ("pi", '\u{03C0}'),
    ("rho", '\u{03C1}'),
    ("sigma", '\u{03C3}'),
    ("tau", '\u{03C4}'),
    ("phi", '\u{03C6}'),
    ("omega", '\u{03C9}'),
    ("Gamma", '\u{0393}'),
    ("Delta", '\u{0394}'),
    ("Theta", '\u{0398}'),
    ("Lambda", '\u{039B}'),
    ("Pi", '\u{03A0}'),
    ("Sigma", '\u{03A3}'),
    ("Phi", '\u{03A6}'),
    ("Omega", '\u{03A9}'),
];

fn named_entity(name: &str) -> Option<char> {
    NAMED_ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|&(_, c)| c)
}

pub fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

struct OpenBlock {
    tag: &'static str,
    order: usize,
    parts: Vec<String>,
}

/// Text of every `<p>` and `<div>` element, in document order of their
/// opening tags. Each element's text is its descendant text segments, trimmed
/// and joined by one space. Script and style contents are skipped.
pub fn block_texts(html: &str) -> Vec<String> {
    let mut finished: Vec<(usize, String)> = Vec::new();
    let mut open: Vec<OpenBlock> = Vec::new();
    let mut opened = 0usize;
    let mut skip_until: Option<&'static str> = None;
    let mut cursor = 0usize;

    let push_text = |open: &mut Vec<OpenBlock>, raw: &str| {
        let text = decode_entities(raw);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        for block in open.iter_mut() {
            block.parts.push(text.to_string());
        }
    };

    let close = |open: &mut Vec<OpenBlock>, finished: &mut Vec<(usize, String)>, tag: &str| {
        if let Some(pos) = open.iter().rposition(|b| b.tag == tag) {
            // 未閉合的內層元素一併結束
            for block in open.drain(pos..).rev() {
                finished.push((block.order, block.parts.join(" ")));
            }
        }
    };

    for caps in tag_regex().captures_iter(html) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((cursor, cursor));
        let Some(name) = caps.get(2) else {
            // comment
            if skip_until.is_none() {
                push_text(&mut open, &html[cursor..whole.0]);
            }
            cursor = whole.1;
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());

        if let Some(raw_tag) = skip_until {
            if closing && name == raw_tag {
                skip_until = None;
            }
            cursor = whole.1;
            continue;
        }

        push_text(&mut open, &html[cursor..whole.0]);
        cursor = whole.1;

        match (name.as_str(), closing) {
            ("script", false) if !self_closing => skip_until = Some("script"),
            ("style", false) if !self_closing => skip_until = Some("style"),
            ("p", false) | ("div", false) => {
                let tag = if name == "p" { "p" } else { "div" };
                // 新段落會隱式結束尚未閉合的段落
                if tag == "p" && open.last().is_some_and(|b| b.tag == "p") {
                    close(&mut open, &mut finished, "p");
                }
                if self_closing {
                    finished.push((opened, String::new()));
                } else {
                    open.push(OpenBlock {
                        tag,
                        order: opened,
                        parts: Vec::new(),
                    });
                }
                opened += 1;
            }
            ("p", true) => close(&mut open, &mut finished, "p"),
            ("div", true) => close(&mut open, &mut finished, "div"),
            _ => {}
        }
    }

    if skip_until.is_none() {
        push_text(&mut open, &html[cursor..]);
    }
    for block in open.drain(..).rev() {
        finished.push((block.order, block.parts.join(" ")));
    }

    finished.sort_by_key(|(order, _)| *order);
    finished.into_iter().map(|(_, text)| text).collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Picks the paragraph that best describes `concept_name`: the first block of
/// at least [`MIN_PARAGRAPH_CHARS`] characters mentioning the name, otherwise
/// the first long block. Truncated to `max_length` characters.
pub fn extract_paragraph(html: &str, concept_name: &str, max_length: usize) -> Option<String> {
    let concept_lower = concept_name.to_lowercase();
    let candidates: Vec<String> = block_texts(html)
        .into_iter()
        .filter(|text| text.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect();

    let chosen = candidates
        .iter()
        .find(|c| c.to_lowercase().contains(&concept_lower))
        .or_else(|| candidates.first())?;

    Some(truncate_chars(chosen, max_length))
}
