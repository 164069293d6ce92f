use std::{env, fs, path::Path, process::ExitCode};

use pyrite::{CompileOptions, OptionPreset, StderrDiag, ast::Module, translate};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = CompileOptions::default();
    let mut inputs: Vec<&str> = Vec::new();
    for arg in &args {
        match arg.as_str() {
            "-O" => options.apply_preset(OptionPreset::Speed),
            "--strict" => options.apply_preset(OptionPreset::Strict),
            "--debug" => options.apply_preset(OptionPreset::Debug),
            other => inputs.push(other),
        }
    }
    let Some(ast_path) = inputs.first() else {
        eprintln!("usage: pyrite [-O|--strict|--debug] <module-ast.json> [module-name]");
        return ExitCode::FAILURE;
    };
    let module_name = match inputs.get(1) {
        Some(name) => (*name).to_owned(),
        None => Path::new(ast_path)
            .file_stem()
            .map_or_else(|| "module".to_owned(), |stem| stem.to_string_lossy().into_owned()),
    };

    let json = match fs::read_to_string(ast_path) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("error: cannot read {ast_path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let module: Module = match serde_json::from_str(&json) {
        Ok(module) => module,
        Err(err) => {
            eprintln!("error: {ast_path} is not a module tree: {err}");
            return ExitCode::FAILURE;
        }
    };
    // The matching source file feeds the store-source traceback table when
    // it sits next to the tree.
    let src = fs::read_to_string(Path::new(ast_path).with_extension("py")).unwrap_or_default();

    match translate(&module_name, &module, &src, options, &mut StderrDiag) {
        Ok(unit) => {
            print!("{}", unit.js);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
