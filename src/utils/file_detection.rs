//! Built-in exclusion tables and text/binary detection.

/// Directory names that are never shown, copied or watched.
pub const IGNORED_DIRS: &[&str] = &[
    ".git", ".svn", ".hg", "Trash", "tmp", "temp",
    ".idea", ".vscode", ".vs", ".settings", ".project", ".classpath", "nbproject",
    "node_modules", "bower_components", "jspm_packages", ".npm", ".yarn",
    "__pycache__", "venv", ".venv", "env", ".env", "pip-wheel-metadata", ".pytest_cache", ".mypy_cache",
    "dist", "build", "out", "target", "bin", "obj", "pkg", "_build", "deps",
    ".next", ".nuxt", ".output", ".docusaurus", "public", "static",
    ".gradle", "gradle", ".m2", "Pods", "DerivedData", ".xcworkspace",
    "vendor", ".bundle", ".terraform", ".serverless", ".aws-sam", ".vercel", ".netlify",
    "coverage", ".nyc_output", "test-results", "logs", "log",
    ".langgraph_api", ".ipynb_checkpoints",
];

/// Exact file names that are never shown or copied as part of a directory.
pub const IGNORED_FILE_NAMES: &[&str] = &[
    "package-lock.json", "yarn.lock", "pnpm-lock.yaml", "Gemfile.lock", "composer.lock", "Cargo.lock",
    ".DS_Store", "Thumbs.db", "desktop.ini",
];

/// Lowercase name suffixes of binary or generated files.
pub const IGNORED_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".bmp", ".tiff", ".heic",
    ".mp3", ".mp4", ".mov", ".avi", ".wav", ".flac", ".mkv", ".webm",
    ".obj", ".fbx", ".blend", ".woff", ".woff2", ".ttf", ".eot", ".otf",
    ".zip", ".tar", ".gz", ".rar", ".7z", ".bz2", ".xz", ".jar", ".war", ".ear",
    ".apk", ".aab", ".ipa", ".exe", ".dll", ".so", ".dylib", ".bin",
    ".o", ".a", ".class", ".pyc", ".pyo", ".pyd", ".gem",
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".rtf",
    ".psd", ".ai", ".eps", ".indd", ".sketch", ".fig",
    ".db", ".sqlite", ".sqlite3", ".mdb", ".accde", ".frm", ".ibd",
    ".map",
    ".pem", ".crt", ".key", ".p12", ".pfx", ".keystore", ".jks",
    ".lock",
];

/// Returns `true` if the (case-insensitive) file name ends with a binary extension.
pub fn has_binary_extension(name: &str, extensions: &[&str]) -> bool {
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext))
}

/// Decodes raw file bytes as text.
///
/// Returns `None` for content that contains a null byte or is not valid UTF-8,
/// which is how binary files are recognised regardless of their extension.
pub fn decode_text(bytes: Vec<u8>) -> Option<String> {
    if bytes.contains(&0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}
