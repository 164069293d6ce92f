//! Import handling: emitted import calls, the dependency trailer with parent
//! packages, and JavaScript file imports with soft warnings.

mod common;

use common::*;
use pyrite::ast::{ImportName, Module, Stmt};
use pyrite::{CollectDiag, JsImportLocation, JsImportMode, translate_with_lookup};

#[test]
fn dotted_import_binds_the_package_root() {
    let unit = compile_with("m", vec![import(&["a.b.c"], 1)], plain_options());
    assert!(unit.js.contains("m['a'] = pyjslib['___import___']('a.b.c', 'm');"));
    assert_eq!(unit.imported_modules, vec!["a.b.c", "a", "a.b"]);
    assert!(unit.js.contains("PYJS_DEPS: ['a.b.c', 'a', 'a.b']"));
}

#[test]
fn aliased_import_binds_the_full_path() {
    let stmt_ = stmt(
        Stmt::Import {
            names: vec![ImportName::aliased("a.b", "short")],
        },
        1,
    );
    let unit = compile_with("m", vec![stmt_], plain_options());
    assert!(unit
        .js
        .contains("m['short'] = pyjslib['___import___']('a.b', 'm',null , false);"));
    assert_eq!(unit.imported_modules, vec!["a.b", "a"]);
}

#[test]
fn from_import_reads_the_module_registry() {
    let unit = compile_with("m", vec![from_import("pkg.mod", &["thing"], 1)], plain_options());
    assert!(unit.js.contains("pyjslib['___import___']('pkg.mod.thing', 'm');"));
    assert!(unit.js.contains("m['thing'] = $pyjs.__modules__['pkg']['mod']['thing'];"));
    assert!(unit.imported_modules.contains(&"pkg.mod.thing".to_owned()));
    assert!(unit.imported_modules.contains(&"pkg".to_owned()));
    assert!(unit.imported_modules.contains(&"pkg.mod".to_owned()));
}

#[test]
fn each_dependency_appears_once() {
    let unit = compile_with(
        "m",
        vec![import(&["a.b"], 1), import(&["a.b"], 2), import(&["a"], 3)],
        plain_options(),
    );
    assert_eq!(unit.imported_modules, vec!["a.b", "a"]);
}

#[test]
fn js_file_imports_skip_parent_expansion() {
    let unit = compile_with("m", vec![import(&["vendor/extras.js"], 1)], plain_options());
    assert_eq!(unit.imported_modules, vec!["vendor/extras.js"]);
    assert_eq!(unit.imported_js.len(), 1);
    assert_eq!(unit.imported_js[0].path, "vendor/extras.js");
}

#[test]
fn missing_js_files_warn_but_translate() {
    let module = Module {
        body: vec![import(&["missing.js"], 1)],
    };
    let mut diag = CollectDiag::new();
    let lookup = |_: &str| false;
    let unit = translate_with_lookup("m", &module, "", plain_options(), &mut diag, Some(&lookup))
        .expect("a missing js file is only a warning");
    assert_eq!(diag.warnings(), ["unable to find imported javascript: missing.js"]);
    assert_eq!(unit.imported_modules, vec!["missing.js"]);
}

#[test]
fn present_js_files_do_not_warn() {
    let module = Module {
        body: vec![import(&["present.js"], 1)],
    };
    let mut diag = CollectDiag::new();
    let lookup = |path: &str| path == "present.js";
    translate_with_lookup("m", &module, "", plain_options(), &mut diag, Some(&lookup))
        .expect("translation succeeds");
    assert!(diag.warnings().is_empty());
}

#[test]
fn jsimport_records_mode_and_location() {
    let call_expr = call(
        name("jsimport", 2),
        vec![string("lib/dom.js", 2), string("static", 2), string("early", 2)],
        2,
    );
    let unit = compile_with(
        "m",
        vec![from_import("__pyjamas__", &["jsimport"], 1), discard(call_expr, 2)],
        plain_options(),
    );
    assert_eq!(unit.imported_js.len(), 1);
    assert_eq!(unit.imported_js[0].path, "lib/dom.js");
    assert_eq!(unit.imported_js[0].mode, JsImportMode::Static);
    assert_eq!(unit.imported_js[0].location, JsImportLocation::Early);
    assert!(!unit.js.contains("jsimport"), "the directive emits nothing");
}

#[test]
fn intrinsics_module_import_is_invisible() {
    let unit = compile_with(
        "m",
        vec![
            import(&["__pyjamas__"], 1),
            from_import("__pyjamas__", &["JS", "wnd"], 2),
        ],
        plain_options(),
    );
    assert!(unit.imported_modules.is_empty());
    assert!(!unit.js.contains("__pyjamas__"));
}

#[test]
fn native_names_pass_through() {
    let unit = compile_with(
        "m",
        vec![
            from_import("__javascript__", &["encodeURIComponent"], 1),
            discard(call(name("encodeURIComponent", 2), vec![string("q", 2)], 2), 2),
        ],
        plain_options(),
    );
    assert!(unit.js.contains("encodeURIComponent(String('q'));"));
    assert!(!unit.js.contains("m.encodeURIComponent"));
}

#[test]
fn window_and_document_handles() {
    let js = compile_js(
        "m",
        vec![
            from_import("__pyjamas__", &["wnd", "doc"], 1),
            assign(
                pyrite::ast::Target::Name("w".to_owned()),
                call(name("wnd", 2), vec![], 2),
                2,
            ),
            assign(
                pyrite::ast::Target::Name("d".to_owned()),
                call(name("doc", 3), vec![], 3),
                3,
            ),
        ],
        plain_options(),
    );
    assert!(js.contains("m['w'] = $wnd;"));
    assert!(js.contains("m['d'] = $doc;"));
}
