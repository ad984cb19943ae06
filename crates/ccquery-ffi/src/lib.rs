//! C ABI for hosts that can only pass a path in and take a string out.
//!
//! ```c
//! char *flags = ccquery_get_includes_and_options("/proj/src/main.cc");
//! use(flags);
//! ccquery_free_string(flags);
//! ```
//!
//! The database is discovered from the queried file. Loaded databases are
//! cached per database file and re-read when their modification time
//! changes. Relative paths are taken relative to the working directory at
//! the time of the call. Any failure yields an empty string; details go to
//! `tracing`.
//!
//! Set `CCQUERY_CONFIG` to a ccquery.toml path to override the defaults.

use ccquery_db::boundary::{collapse, Operation};
use ccquery_db::path::absolutize;
use ccquery_db::{locate, CompilationDatabase, QueryConfig, QueryError, Session};
use core::ffi::c_char;
use rustc_hash::FxHashMap;
use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::SystemTime;

struct CachedSession {
    modified: Option<SystemTime>,
    session: Arc<Session>,
}

fn cache() -> &'static Mutex<FxHashMap<PathBuf, CachedSession>> {
    static CACHE: OnceLock<Mutex<FxHashMap<PathBuf, CachedSession>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(FxHashMap::default()))
}

fn config() -> &'static QueryConfig {
    static CONFIG: OnceLock<QueryConfig> = OnceLock::new();
    CONFIG.get_or_init(|| match std::env::var_os("CCQUERY_CONFIG") {
        Some(path) => QueryConfig::from_file(Path::new(&path)).unwrap_or_else(|e| {
            tracing::error!("{}", e);
            QueryConfig::default()
        }),
        None => QueryConfig::default(),
    })
}

/// The session for the database covering `file`, loading it if needed.
/// Relative queries against the session resolve from `cwd`.
fn session_for(file: &Path, cwd: &Path) -> ccquery_db::Result<Arc<Session>> {
    let config = config();
    let db_path = locate(&absolutize(file, cwd), &config.database)?;
    let modified = std::fs::metadata(&db_path).and_then(|m| m.modified()).ok();

    let mut cache = cache().lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(cached) = cache.get(&db_path) {
        if cached.modified == modified && cached.session.base_dir() == cwd {
            return Ok(Arc::clone(&cached.session));
        }
        tracing::debug!("{} changed, reloading", db_path.display());
    }

    let db = CompilationDatabase::from_file(&db_path)?;
    let session = Arc::new(Session::new(db, config.clone()).with_base_dir(cwd));
    cache.insert(
        db_path,
        CachedSession {
            modified,
            session: Arc::clone(&session),
        },
    );
    Ok(session)
}

fn run(op: Operation, path: *const c_char) -> *mut c_char {
    let answer = if path.is_null() {
        String::new()
    } else {
        // SAFETY: checked non-null; the caller guarantees NUL termination.
        let raw = unsafe { CStr::from_ptr(path) };
        let file = PathBuf::from(raw.to_string_lossy().into_owned());
        let result = std::env::current_dir()
            .map_err(|e| QueryError::Io {
                path: PathBuf::from("."),
                source: e,
            })
            .and_then(|cwd| session_for(&file, &cwd))
            .and_then(|session| op.query(&session, &file));
        collapse(result, &file)
    };

    CString::new(answer).unwrap_or_default().into_raw()
}

/// Include flags (`-I<dir> `) followed by the remaining options.
///
/// # Safety
/// `path` must be null or a valid NUL-terminated string. The result must be
/// released with [`ccquery_free_string`].
#[no_mangle]
pub unsafe extern "C" fn ccquery_get_includes_and_options(path: *const c_char) -> *mut c_char {
    run(Operation::IncludesAndOptions, path)
}

/// Options without include flags.
///
/// # Safety
/// Same contract as [`ccquery_get_includes_and_options`].
#[no_mangle]
pub unsafe extern "C" fn ccquery_get_options(path: *const c_char) -> *mut c_char {
    run(Operation::Options, path)
}

/// Bare include directories.
///
/// # Safety
/// Same contract as [`ccquery_get_includes_and_options`].
#[no_mangle]
pub unsafe extern "C" fn ccquery_get_includes(path: *const c_char) -> *mut c_char {
    run(Operation::Includes, path)
}

/// Release a string returned by this library.
///
/// # Safety
/// `s` must be null or a pointer obtained from one of the query functions,
/// not yet freed.
#[no_mangle]
pub unsafe extern "C" fn ccquery_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
