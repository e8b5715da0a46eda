//! Interop tests - ABI mirrors, library loading, engine strings, scripted engine

use super::native::resolve_library_path;
use super::types::*;
use super::*;
use core::mem::{align_of, size_of};
use std::path::PathBuf;

#[test]
fn test_abi_layouts_match_pointer_width() {
    let word = size_of::<usize>();
    assert_eq!(size_of::<CXCompletionResult>(), 2 * word);
    assert_eq!(size_of::<CXCodeCompleteResults>(), 2 * word);
    assert_eq!(size_of::<CXCursor>(), 8 + 3 * word);
    assert_eq!(align_of::<CXCompletionResult>(), align_of::<usize>());
}

#[test]
fn test_host_record_layout() {
    let layout = RecordLayout::host();
    assert_eq!(layout.size, size_of::<CXCompletionResult>());
    assert_eq!(layout.completion_string, Some(size_of::<usize>()));
}

#[test]
fn test_null_cursor_is_null() {
    assert!(CXCursor::null().is_null());
    let tu_cursor = CXCursor {
        kind: CX_CURSOR_TRANSLATION_UNIT,
        xdata: 0,
        data: [core::ptr::null(), core::ptr::null(), 0x10 as *const _],
    };
    assert!(!tu_cursor.is_null());
}

#[test]
fn test_load_missing_library_fails() {
    let err = Library::load_path("/definitely/not/here/libclang.so").unwrap_err();
    assert!(matches!(err, LoadError::LoadFailed { .. }));
}

#[test]
fn test_load_rejects_empty_name() {
    assert!(matches!(Library::load(""), Err(LoadError::InvalidName)));
    assert!(matches!(Library::load_path(""), Err(LoadError::InvalidName)));
}

#[test]
fn test_library_path_resolution_order() {
    let configured = resolve_library_path(Some("/opt/llvm/lib/libclang.so"), Some("/x".into()));
    assert_eq!(configured, Some(PathBuf::from("/opt/llvm/lib/libclang.so")));

    let dir = tempfile::tempdir().unwrap();
    let from_dir = resolve_library_path(None, Some(dir.path().to_path_buf()));
    assert_eq!(from_dir, Some(dir.path().join(DEFAULT_LIBRARY_NAME)));

    let from_file = resolve_library_path(None, Some("/usr/lib/libclang-17.so".into()));
    assert_eq!(from_file, Some(PathBuf::from("/usr/lib/libclang-17.so")));

    assert_eq!(resolve_library_path(None, None), None);
}

#[test]
fn test_load_by_name_reports_missing_library() {
    let err = Library::load("libcindex-bridge-missing.so").unwrap_err();
    match err {
        LoadError::LoadFailed { path, .. } => {
            assert_eq!(path, PathBuf::from("libcindex-bridge-missing.so"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_binding_from_config_uses_configured_path() {
    let config = crate::config::EngineConfig {
        library_path: Some("/definitely/not/here/libclang.so".into()),
        ..Default::default()
    };
    let err = LibclangBinding::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here/libclang.so"));
}

#[test]
fn test_engine_string_disposed_once() {
    let engine = ScriptedEngine::new()
        .with_candidates(vec![ScriptedCandidate::new(0, 1).with_comment("doc")]);
    let block = unsafe {
        engine.code_complete_at(
            0x1 as CXTranslationUnit,
            c"a.c".as_ptr(),
            1,
            1,
            core::ptr::null_mut(),
            0,
            0,
        )
    };
    let s = unsafe { (*(*block).results).completion_string };

    let text = unsafe { take_string(&engine, engine.completion_brief_comment(s)) };
    assert_eq!(text.as_deref(), Some("doc"));

    unsafe { engine.dispose_code_complete_results(block) };
    let stats = engine.stats();
    assert_eq!(stats.strings_created, 1);
    assert_eq!(stats.strings_disposed, 1);
    assert_eq!(stats.invalid_disposals, 0);
}

#[test]
fn test_null_engine_string_is_none() {
    let engine = ScriptedEngine::new();
    let text = unsafe { take_string(&engine, CXString::null()) };
    assert_eq!(text, None);
    assert_eq!(engine.stats().strings_disposed, 1);
}

#[test]
fn test_scripted_double_dispose_is_counted() {
    let engine = ScriptedEngine::new();
    let block = unsafe {
        engine.code_complete_at(
            0x1 as CXTranslationUnit,
            c"a.c".as_ptr(),
            1,
            1,
            core::ptr::null_mut(),
            0,
            0,
        )
    };
    unsafe {
        engine.dispose_code_complete_results(block);
        engine.dispose_code_complete_results(block);
    }
    let stats = engine.stats();
    assert_eq!(stats.results_disposed, 1);
    assert_eq!(stats.invalid_disposals, 1);
    assert_eq!(stats.live_result_blocks, 0);
}

#[test]
fn test_scripted_empty_block_has_null_base() {
    let engine = ScriptedEngine::new();
    let block = unsafe {
        engine.code_complete_at(
            0x1 as CXTranslationUnit,
            c"a.c".as_ptr(),
            3,
            7,
            core::ptr::null_mut(),
            0,
            0,
        )
    };
    unsafe {
        assert_eq!((*block).num_results, 0);
        assert!((*block).results.is_null());
        engine.dispose_code_complete_results(block);
    }
    let recorded = engine.last_completion().unwrap();
    assert_eq!((recorded.line, recorded.column), (3, 7));
    assert_eq!(recorded.filename, "a.c");
}
