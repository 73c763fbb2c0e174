//! Source discovery, compilation assembly and output writing for `refine-gen`.
//!
//! The engine (`refine_core`) never touches the file system; everything that reads a source tree or writes generated
//! units lives here.
//!
//! ## Notes
//!
//! - Discovery order is sorted so candidate enumeration, and therefore output, is stable across runs.
//! - Rendering runs on the rayon pool; analysis stays on the calling thread.
//! - Units are only rewritten when their content changed.
//! - Two wrappers that map to the same file name are both rejected; neither unit is written.
//! - Stale units left behind by removed wrappers are recognised by the `@generated` marker and nothing else.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;
use refine_core::synth::GENERATED_MARKER;
use refine_core::{Compilation, GenerationError, GeneratorConfig, ModulePath, SourceUnit, WrapperDescriptor};

/// Maximum size of a single source file (10 MB).
const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

/// Settings of one driver run, filled from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Report stale or missing units instead of writing them.
    pub check: bool,
    /// Worker threads for rendering (`None` lets rayon decide).
    pub jobs: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            out_dir: PathBuf::from("src/generated"),
            check: false,
            jobs: None,
        }
    }
}

/// Errors raised while reading a source tree or writing generated units.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("cannot read `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("`{path}` is too large ({size} bytes)")]
    TooLarge { path: PathBuf, size: u64 },

    #[error("cannot write `{path}`: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("no `.rs` files found under `{0}`")]
    NoSources(PathBuf),

    #[error("cannot start the render pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A parsed source tree plus what is needed to report on it.
#[derive(Debug, Default)]
pub struct LoadedProject {
    pub compilation: Compilation,
    /// Unit name -> source text, for diagnostics with context.
    pub sources: BTreeMap<String, String>,
    /// Files that failed to parse. They are left out of the compilation.
    pub parse_errors: Vec<GenerationError>,
}

/// Every `.rs` file below `root`, sorted, skipping hidden directories and `target`.
///
/// `out_dir` is skipped too, so generated units never feed back into a run.
pub fn discover_sources(root: &Path, out_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if root.is_file() {
        if root.extension().is_some_and(|ext| ext == "rs") {
            files.push(root.to_path_buf());
        }
        return files;
    }
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                let is_out = out_dir.is_some_and(|out| same_path(out, &path));
                if !name.starts_with('.') && name != "target" && !is_out {
                    files.extend(discover_sources(&path, out_dir));
                }
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Module path of `file` inside a source tree rooted at `root`.
///
/// `lib.rs` and `main.rs` at the root are the crate root; `a.rs` and `a/mod.rs` are `crate::a`; `a/b.rs` is
/// `crate::a::b`.
pub fn module_path_for(root: &Path, file: &Path, module_root: &str) -> ModulePath {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if let Some(last) = segments.pop() {
        let stem = last.strip_suffix(".rs").unwrap_or(&last).to_string();
        let is_root_file = segments.is_empty() && (stem == "lib" || stem == "main");
        if stem != "mod" && !is_root_file {
            segments.push(stem);
        }
    }
    let mut module = ModulePath::root(module_root);
    for segment in &segments {
        module = module.child(segment);
    }
    module
}

/// Read a source file, refusing anything larger than 10 MB.
pub fn read_source(path: &Path) -> Result<String, ProjectError> {
    let metadata = fs::metadata(path).map_err(|source| ProjectError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(ProjectError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
        });
    }
    fs::read_to_string(path).map_err(|source| ProjectError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse every discovered file under `config.src_dir` into one compilation.
///
/// A file that fails to parse is recorded in [`LoadedProject::parse_errors`] and the rest still load.
#[tracing::instrument(skip_all, fields(src = %config.src_dir.display()))]
pub fn load(config: &DriverConfig, generator: &GeneratorConfig) -> Result<LoadedProject, ProjectError> {
    let files = discover_sources(&config.src_dir, Some(&config.out_dir));
    if files.is_empty() {
        return Err(ProjectError::NoSources(config.src_dir.clone()));
    }
    let root = if config.src_dir.is_file() {
        config.src_dir.parent().unwrap_or(Path::new(".")).to_path_buf()
    } else {
        config.src_dir.clone()
    };

    let mut project = LoadedProject::default();
    for file in &files {
        let source = read_source(file)?;
        let name = unit_name(&root, file);
        let module = module_path_for(&root, file, &generator.module_root);
        tracing::debug!(unit = %name, module = %module, "loading source unit");
        match SourceUnit::parse(name.clone(), module, &source) {
            Ok(unit) => project.compilation.push(unit),
            Err(err) => {
                tracing::warn!(unit = %name, error = %err, "skipping unparsable file");
                project.parse_errors.push(err);
            }
        }
        project.sources.insert(name, source);
    }
    Ok(project)
}

fn unit_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// File name of the unit generated for `desc`: module segments below the root, then the snake-cased wrapper name.
///
/// `crate::model::ValidatedPerson` becomes `model_validated_person.rs`.
pub fn output_file_name(desc: &WrapperDescriptor) -> String {
    let mut parts: Vec<String> = desc.namespace.segments().iter().skip(1).cloned().collect();
    parts.push(to_snake_case(&desc.name));
    format!("{}.rs", parts.join("_"))
}

pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}

/// One rendered unit, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    pub wrapper: String,
    pub file_name: String,
    pub result: Result<String, GenerationError>,
}

/// Render every descriptor on the rayon pool, keeping the input order.
///
/// Units whose file names collide are turned into [`GenerationError::OutputCollision`].
#[tracing::instrument(skip_all, fields(count = descriptors.len()))]
pub fn render_all(
    descriptors: &[WrapperDescriptor],
    generator: &GeneratorConfig,
    jobs: Option<usize>,
) -> Result<Vec<RenderedUnit>, ProjectError> {
    let render = || {
        descriptors
            .par_iter()
            .map(|desc| RenderedUnit {
                wrapper: desc.qualified_name(),
                file_name: output_file_name(desc),
                result: refine_core::render(desc, generator),
            })
            .collect::<Vec<_>>()
    };
    let mut units = match jobs {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            pool.install(render)
        }
        None => render(),
    };
    reject_collisions(&mut units);
    Ok(units)
}

fn reject_collisions(units: &mut [RenderedUnit]) {
    let mut owners: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for unit in units.iter() {
        owners.entry(unit.file_name.clone()).or_default().push(unit.wrapper.clone());
    }
    for unit in units.iter_mut() {
        let Some(names) = owners.get(&unit.file_name) else {
            continue;
        };
        if names.len() < 2 {
            continue;
        }
        let others: Vec<&str> = names
            .iter()
            .filter(|name| **name != unit.wrapper)
            .map(String::as_str)
            .collect();
        tracing::warn!(wrapper = %unit.wrapper, file = %unit.file_name, "output file name collision");
        unit.result = Err(GenerationError::OutputCollision {
            wrapper: unit.wrapper.clone(),
            other: others.join("`, `"),
            file: unit.file_name.clone(),
        });
    }
}

/// What happened to each output file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Missing or out-of-date files (check mode only).
    pub stale: Vec<PathBuf>,
}

/// Write rendered units into `out_dir`, touching only files whose content changed.
///
/// In check mode nothing is written; differing files are listed in [`WriteSummary::stale`].
pub fn write_units<'a>(
    out_dir: &Path,
    units: impl IntoIterator<Item = (&'a str, &'a str)>,
    check: bool,
) -> Result<WriteSummary, ProjectError> {
    let mut summary = WriteSummary::default();
    if !check {
        fs::create_dir_all(out_dir).map_err(|source| ProjectError::Write {
            path: out_dir.to_path_buf(),
            source,
        })?;
    }
    for (file_name, text) in units {
        let path = out_dir.join(file_name);
        let current = fs::read_to_string(&path).ok();
        if current.as_deref() == Some(text) {
            summary.unchanged.push(path);
        } else if check {
            summary.stale.push(path);
        } else {
            fs::write(&path, text).map_err(|source| ProjectError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "wrote generated unit");
            summary.written.push(path);
        }
    }
    Ok(summary)
}

/// Generated units in `out_dir` that are not in `keep`, sorted.
///
/// Only `.rs` files starting with the `@generated` marker count; anything else in the directory is left alone.
pub fn find_orphans(out_dir: &Path, keep: &[PathBuf]) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(out_dir) else {
        return Vec::new();
    };
    let mut orphans: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs") && !keep.contains(path))
        .filter(|path| fs::read_to_string(path).is_ok_and(|text| text.starts_with(GENERATED_MARKER)))
        .collect();
    orphans.sort();
    orphans
}

/// Delete orphaned units found by [`find_orphans`].
pub fn remove_units(paths: &[PathBuf]) -> Result<(), ProjectError> {
    for path in paths {
        fs::remove_file(path).map_err(|source| ProjectError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "removed orphaned unit");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_paths_follow_file_layout() {
        let root = Path::new("src");
        let path = |p: &str| module_path_for(root, &root.join(p), "crate").to_string();
        assert_eq!(path("lib.rs"), "crate");
        assert_eq!(path("main.rs"), "crate");
        assert_eq!(path("model.rs"), "crate::model");
        assert_eq!(path("model/mod.rs"), "crate::model");
        assert_eq!(path("model/person.rs"), "crate::model::person");
        assert_eq!(path("model/lib.rs"), "crate::model::lib");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("X10"), "x10");
        assert_eq!(to_snake_case("FullName"), "full_name");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
        assert_eq!(to_snake_case("ValidatedPerson2"), "validated_person2");
    }

    #[test]
    fn test_write_is_incremental() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_units(dir.path(), [("a.rs", "one"), ("b.rs", "two")], false).unwrap();
        assert_eq!(first.written.len(), 2);

        let second = write_units(dir.path(), [("a.rs", "one"), ("b.rs", "three")], false).unwrap();
        assert_eq!(second.unchanged, vec![dir.path().join("a.rs")]);
        assert_eq!(second.written, vec![dir.path().join("b.rs")]);
    }

    #[test]
    fn test_check_mode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let summary = write_units(&out, [("a.rs", "one")], true).unwrap();
        assert_eq!(summary.stale, vec![out.join("a.rs")]);
        assert!(!out.exists());
    }

    fn unit(wrapper: &str, file_name: &str) -> RenderedUnit {
        RenderedUnit {
            wrapper: wrapper.to_string(),
            file_name: file_name.to_string(),
            result: Ok(format!("// {wrapper}")),
        }
    }

    #[test]
    fn test_colliding_file_names_are_rejected() {
        let mut units = vec![
            unit("crate::model::ValidatedPerson", "model_validated_person.rs"),
            unit("crate::names::FullName", "names_full_name.rs"),
            unit("crate::model_validated::Person", "model_validated_person.rs"),
        ];
        reject_collisions(&mut units);

        assert!(units[1].result.is_ok());
        match &units[0].result {
            Err(GenerationError::OutputCollision { other, file, .. }) => {
                assert_eq!(other, "crate::model_validated::Person");
                assert_eq!(file, "model_validated_person.rs");
            }
            other => panic!("expected a collision, got {other:?}"),
        }
        assert_eq!(units[2].result.as_ref().unwrap_err().code(), "refine::output");
    }

    #[test]
    fn test_orphans_are_generated_units_only() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.rs");
        fs::write(&kept, format!("{GENERATED_MARKER}\npub struct Kept;\n")).unwrap();
        fs::write(dir.path().join("gone.rs"), format!("{GENERATED_MARKER}\npub struct Gone;\n")).unwrap();
        fs::write(dir.path().join("mod.rs"), "pub mod kept;\n").unwrap();
        fs::write(dir.path().join("notes.txt"), GENERATED_MARKER).unwrap();

        let orphans = find_orphans(dir.path(), &[kept]);
        assert_eq!(orphans, vec![dir.path().join("gone.rs")]);

        remove_units(&orphans).unwrap();
        assert!(!dir.path().join("gone.rs").exists());
        assert!(dir.path().join("mod.rs").exists());
    }

    #[test]
    fn test_orphans_of_missing_dir_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_orphans(&dir.path().join("nowhere"), &[]).is_empty());
    }

    #[test]
    fn test_discovery_skips_hidden_and_target() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["lib.rs", "a/mod.rs", ".hidden/x.rs", "target/y.rs", "notes.txt"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let found: Vec<String> = discover_sources(dir.path(), None)
            .iter()
            .map(|p| unit_name(dir.path(), p))
            .collect();
        assert_eq!(found, vec!["a/mod.rs", "lib.rs"]);
    }
}
