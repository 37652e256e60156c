//! Output file name assignment for leaf parts.

use std::collections::HashMap;

use crate::{config::NamingPolicy, parser::headers::PartContentType, Part};

/// Index used for every synthesized name under [`NamingPolicy::Literal`].
pub const LITERAL_INDEX: usize = 1;

/// Conventional extensions for types whose registered list sorts an unusual one first.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("application/octet-stream", "bin"),
    ("application/javascript", "js"),
    ("image/jpeg", "jpg"),
    ("image/svg+xml", "svg"),
    ("image/tiff", "tif"),
    ("message/rfc822", "eml"),
    ("text/calendar", "ics"),
    ("text/html", "html"),
    ("text/plain", "txt"),
];

/// Returns the file extension for a media type, without the dot.
///
/// Common types map to their conventional extension; anything else gets the
/// first entry of the `mime_guess` table, which is sorted alphabetically.
pub fn extension_for(mime: &mime::Mime) -> Option<&'static str> {
    let essence = mime.essence_str();
    PREFERRED_EXTENSIONS
        .iter()
        .find(|(media_type, _)| *media_type == essence)
        .map(|(_, ext)| *ext)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(essence)
                .and_then(|extensions| extensions.first().copied())
        })
}

/// Reduces a declared file name to a single safe path component.
///
/// Directory parts are dropped and control characters replaced, so a
/// hostile name cannot escape the output directory. Other characters are kept.
pub fn sanitize_filename(input: &str) -> String {
    let base = input.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|ch| if ch.is_control() { '_' } else { ch })
        .collect();

    match cleaned.trim_matches(' ') {
        "" | "." | ".." => "file".to_owned(),
        name => name.to_owned(),
    }
}

/// Synthesizes `"<radix>-<index><ext>"`, omitting `<ext>` for missing, invalid or unknown types.
pub fn synthesize_file_name(radix: &str, index: usize, content_type: &PartContentType) -> String {
    match content_type.mime().and_then(extension_for) {
        Some(ext) => format!("{radix}-{index}.{ext}"),
        None => format!("{radix}-{index}"),
    }
}

/// Builds the output name of a leaf part.
///
/// The explicit `Content-Disposition` file name wins, reduced to its last path
/// component; otherwise the name is synthesized from `radix` (the enclosing
/// boundary) and `index`.
pub fn build_file_name(part: &Part, radix: &str, index: usize) -> String {
    match part.file_name() {
        Some(name) => sanitize_filename(name),
        None => synthesize_file_name(radix, index, part.content_type()),
    }
}

/// Stateful name assignment for one extraction run.
#[derive(Debug, Clone, Default)]
pub struct FileNamer {
    policy: NamingPolicy,
    used: HashMap<String, usize>,
}

impl FileNamer {
    /// Creates a namer for the given policy.
    pub fn new(policy: NamingPolicy) -> Self {
        Self {
            policy,
            used: HashMap::new(),
        }
    }

    /// Assigns the output name of the `sibling` (1-based) leaf under `radix`.
    pub fn assign(&mut self, part: &Part, radix: &str, sibling: usize) -> String {
        match self.policy {
            NamingPolicy::Literal => build_file_name(part, radix, LITERAL_INDEX),
            NamingPolicy::Unique => {
                let candidate = build_file_name(part, radix, sibling);
                self.claim(candidate)
            }
        }
    }

    fn claim(&mut self, candidate: String) -> String {
        let Some(&seen) = self.used.get(&candidate) else {
            self.used.insert(candidate.clone(), 1);
            return candidate;
        };

        let mut suffix = seen + 1;
        let unique = loop {
            let name = with_suffix(&candidate, suffix);
            if !self.used.contains_key(&name) {
                break name;
            }
            suffix += 1;
        };

        self.used.insert(candidate, suffix);
        self.used.insert(unique.clone(), 1);
        unique
    }
}

fn with_suffix(name: &str, suffix: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{suffix}{}", &name[..dot], &name[dot..]),
        _ => format!("{name}-{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_name_uses_registered_extension() {
        let pdf = PartContentType::Parsed(mime::APPLICATION_PDF);
        assert_eq!(synthesize_file_name("b1", 1, &pdf), "b1-1.pdf");
    }

    #[test]
    fn synthesized_name_omits_unknown_extension() {
        let unknown = PartContentType::Parsed("application/x-mimesplit-unknown".parse().expect("mime"));
        assert_eq!(synthesize_file_name("b1", 1, &unknown), "b1-1");
        assert_eq!(synthesize_file_name("b1", 1, &PartContentType::Missing), "b1-1");
        assert_eq!(
            synthesize_file_name("b1", 1, &PartContentType::Invalid("??".to_owned())),
            "b1-1"
        );
    }

    #[test]
    fn common_types_use_conventional_extensions() {
        let ext = |value: &str| extension_for(&value.parse().expect("mime"));
        assert_eq!(ext("text/plain"), Some("txt"));
        assert_eq!(ext("application/octet-stream"), Some("bin"));
        assert_eq!(ext("image/jpeg"), Some("jpg"));
        assert_eq!(ext("text/html; charset=utf-8"), Some("html"));
        assert_eq!(ext("application/pdf"), Some("pdf"));
    }

    #[test]
    fn sanitize_drops_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("dir/"), "file");
        assert_eq!(sanitize_filename(".."), "file");
    }

    #[test]
    fn sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("Résumé final.pdf"), "Résumé final.pdf");
        assert_eq!(sanitize_filename("tab\there.txt"), "tab_here.txt");
    }

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(with_suffix("report.pdf", 2), "report-2.pdf");
        assert_eq!(with_suffix("archive.tar.gz", 3), "archive.tar-3.gz");
        assert_eq!(with_suffix("README", 2), "README-2");
        assert_eq!(with_suffix(".hidden", 2), ".hidden-2");
    }

    #[test]
    fn claim_never_hands_out_a_name_twice() {
        let mut namer = FileNamer::new(NamingPolicy::Unique);
        let names: Vec<_> = ["a.txt", "a.txt", "a-2.txt", "a.txt"]
            .into_iter()
            .map(|name| namer.claim(name.to_owned()))
            .collect();
        assert_eq!(names, ["a.txt", "a-2.txt", "a-2-2.txt", "a-3.txt"]);
    }
}
