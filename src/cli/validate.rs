use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use mztab::cvmapping::{load_file, Ontology, TermLookup, TermStrictness, TimedLookup};
use mztab::error::{Level, ValidationReport, DEFAULT_MAX_DIAGNOSTICS};
use mztab::parser::{parse_file, ParseOptions};
use mztab::validator::{validate, ValidationOptions};

use super::config::Config;

/// Arguments of the validate command as given on the command line.
pub struct ValidateArgs {
    pub file: PathBuf,
    pub level: Option<Level>,
    pub max_errors: Option<usize>,
    pub mapping: Option<PathBuf>,
    pub ontology: Option<PathBuf>,
    pub strict_terms: bool,
    pub lookup_timeout_ms: Option<u64>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

/// Effective settings after merging the config file under the flags.
#[derive(Debug, PartialEq)]
struct Settings {
    level: Level,
    max_errors: usize,
    mapping: Option<PathBuf>,
    ontology: Option<PathBuf>,
    strictness: TermStrictness,
    lookup_timeout: Option<Duration>,
}

impl Settings {
    fn resolve(args: &ValidateArgs, config: Config) -> Result<Self> {
        let file = config.validation;
        let level = match (args.level, file.level) {
            (Some(level), _) => level,
            (None, Some(name)) => Level::parse(&name)
                .with_context(|| format!("Invalid level in config file: {}", name))?,
            (None, None) => Level::Info,
        };
        let strict = args.strict_terms || file.strict_terms.unwrap_or(false);

        Ok(Self {
            level,
            max_errors: args.max_errors.or(file.max_errors).unwrap_or(DEFAULT_MAX_DIAGNOSTICS),
            mapping: args.mapping.clone().or(file.mapping),
            ontology: args.ontology.clone().or(file.ontology),
            strictness: if strict {
                TermStrictness::Strict
            } else {
                TermStrictness::Lenient
            },
            lookup_timeout: args
                .lookup_timeout_ms
                .or(file.lookup_timeout_ms)
                .map(Duration::from_millis),
        })
    }
}

fn load_lookup(settings: &Settings) -> Result<Box<dyn TermLookup>> {
    let ontology = match &settings.ontology {
        Some(path) => Ontology::from_obo_file(path)
            .with_context(|| format!("Failed to load ontology: {}", path.display()))?,
        None => Ontology::new(),
    };
    Ok(match settings.lookup_timeout {
        Some(timeout) => Box::new(TimedLookup::new(ontology, timeout)),
        None => Box::new(ontology),
    })
}

/// Validate an mzTab-M file
pub fn run(args: ValidateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let settings = Settings::resolve(&args, config)?;

    info!("mzTab-M Validator");
    info!("File: {}", args.file.display());

    let outcome = parse_file(&args.file, &ParseOptions::new(settings.level, settings.max_errors))
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut report = ValidationReport::new(args.file.display().to_string(), settings.level);
    report.parsed = outcome.file.is_some();
    report.aborted = outcome
        .fatal
        .as_ref()
        .map(|d| d.to_string())
        .or_else(|| outcome.overflow.map(|o| o.to_string()));
    report.extend_from(&outcome.diagnostics);

    if let (Some(mapping), Some(file)) = (&settings.mapping, &outcome.file) {
        let rules = load_file(mapping)
            .with_context(|| {
                format!(
                    "Failed to load CV mapping rules from {}; no rule was applied",
                    mapping.display()
                )
            })?;
        let lookup = load_lookup(&settings)?;
        let options = ValidationOptions {
            strictness: settings.strictness,
            minimum_level: settings.level,
            max_diagnostics: settings.max_errors,
        };
        match validate(file, &rules, lookup.as_ref(), &options) {
            Ok(result) => {
                report.extend_from(&result.diagnostics);
                report.unchecked_rules.extend(result.unchecked);
            }
            Err(overflow) => report.aborted = Some(overflow.to_string()),
        }
    }

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        #[cfg(feature = "colorized_output")]
        {
            println!("{}", report.format_colored());
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            println!("{}", report);
        }
    }

    // Exit with error code if validation failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ValidateArgs {
        ValidateArgs {
            file: PathBuf::from("study.mztab"),
            level: None,
            max_errors: None,
            mapping: None,
            ontology: None,
            strict_terms: false,
            lookup_timeout_ms: None,
            config: None,
            json: false,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&args(), Config::default()).unwrap();
        assert_eq!(settings.level, Level::Info);
        assert_eq!(settings.max_errors, DEFAULT_MAX_DIAGNOSTICS);
        assert_eq!(settings.strictness, TermStrictness::Lenient);
        assert_eq!(settings.lookup_timeout, None);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::from_str(
            "[validation]\nlevel = \"error\"\nmax_errors = 10\nmapping = \"a.xml\"\nlookup_timeout_ms = 50\n",
        )
        .unwrap();
        let mut args = args();
        args.level = Some(Level::Warn);
        args.mapping = Some(PathBuf::from("b.xml"));
        let settings = Settings::resolve(&args, config).unwrap();
        assert_eq!(settings.level, Level::Warn);
        assert_eq!(settings.max_errors, 10);
        assert_eq!(settings.mapping, Some(PathBuf::from("b.xml")));
        assert_eq!(settings.lookup_timeout, Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_bad_level_in_config() {
        let config = Config::from_str("[validation]\nlevel = \"loud\"\n").unwrap();
        assert!(Settings::resolve(&args(), config).is_err());
    }
}
