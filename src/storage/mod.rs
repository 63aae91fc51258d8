use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

pub fn ensure_dirs(upload_folder: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(upload_folder)
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename pattern"))
}

/// Reduces an uploaded filename to a flat, ASCII-only name that is safe to
/// join onto the upload folder. Accented letters keep their base letter.
/// May return an empty string.
pub fn secure_filename(original: &str) -> String {
    let flattened: String = original
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars().replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// `john_doe-resume.pdf` -> `John Doe Resume`.
pub fn candidate_name_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    title_case(&stem.replace(['_', '-'], " "))
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Writes `data` under `folder` using the sanitized name; an existing file
/// with the same name is replaced.
pub fn save_upload(folder: &Path, original: &str, data: &[u8]) -> std::io::Result<(String, PathBuf)> {
    let filename = secure_filename(original);
    if filename.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("unusable filename: {original:?}"),
        ));
    }
    let path = folder.join(&filename);
    std::fs::write(&path, data)?;
    Ok((filename, path))
}

/// Resolves a stored upload for download, refusing anything that is not a
/// plain file name.
pub fn stored_upload(folder: &Path, filename: &str) -> Option<PathBuf> {
    if filename.is_empty() || filename.contains("..") || secure_filename(filename) != filename {
        return None;
    }
    let path = folder.join(filename);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_filename_strips_paths_and_odd_characters() {
        assert_eq!(secure_filename("My Resume (final).pdf"), "My_Resume_final.pdf");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\Users\\ann\\cv.pdf"), "C_Users_ann_cv.pdf");
        assert_eq!(secure_filename("résumé.pdf"), "resume.pdf");
        assert_eq!(secure_filename("José Muñoz CV.pdf"), "Jose_Munoz_CV.pdf");
        assert_eq!(secure_filename("履歴書.pdf"), "pdf");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn candidate_names_come_from_filenames() {
        assert_eq!(candidate_name_from_filename("john_doe-resume.pdf"), "John Doe Resume");
        assert_eq!(candidate_name_from_filename("ANN_LEE.pdf"), "Ann Lee");
        assert_eq!(candidate_name_from_filename("o'neil_cv2.pdf"), "O'Neil Cv2");
        assert_eq!(
            candidate_name_from_filename(&secure_filename("josé_muñoz.pdf")),
            "Jose Munoz"
        );
    }

    #[test]
    fn save_and_resolve_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let (name, path) = save_upload(dir.path(), "Ann Lee.pdf", b"%PDF").unwrap();
        assert_eq!(name, "Ann_Lee.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF");

        assert_eq!(stored_upload(dir.path(), "Ann_Lee.pdf"), Some(path));
        assert_eq!(stored_upload(dir.path(), "../Ann_Lee.pdf"), None);
        assert_eq!(stored_upload(dir.path(), "missing.pdf"), None);
        assert!(save_upload(dir.path(), "???", b"x").is_err());
    }
}
