//! sqlvet CLI - SQL lint tool

mod args;
mod check;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, NamedSource, Result};
use sqlvet_core::rules::{builtin_rules, rule_by_code};
use sqlvet_core::{
    coordinate_of, ChainBuilder, LintRule, QueryEngine, Severity, SqlDialect, SqlTokenizer,
    Tokenize, ValidatorChain, ValidatorRegistry,
};

use crate::args::{Args, Command};
use crate::check::{check_sources, CheckStatus};
use crate::config::Config;
use crate::output::OutputFormatter;

const VALIDATOR_NAME: &str = "sqlvet";

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let level = if args.quiet {
        tracing::Level::ERROR
    } else {
        match args.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(CheckStatus::NotRun.exit_code())
        }
    }
}

fn run(args: Args) -> Result<CheckStatus> {
    match args.command {
        Command::Check {
            files,
            config: config_path,
            dialect,
            format,
            disable,
            vars,
            uid,
            engine_id,
        } => {
            // Load configuration
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };

            // Merge CLI args with config (CLI takes precedence)
            let config = config.merge_with_args(&files, &dialect, &format, &disable, &vars)?;

            let dialect: SqlDialect = config
                .dialect
                .as_deref()
                .unwrap_or("postgresql")
                .parse()
                .map_err(|e: String| miette::miette!(e))?;
            let output_format = config.format.unwrap_or_default();

            let chain = build_chain(&config, dialect)?;
            tracing::debug!(rules = ?chain.rule_codes(), "validator chain built");

            let mut registry = ValidatorRegistry::new();
            registry.register(chain, [dialect.name()]);
            let engine = QueryEngine {
                id: engine_id,
                language: dialect.name().to_string(),
                validator: Some(VALIDATOR_NAME.to_string()),
            };

            let query_files = collect_query_files(&config.files)?;
            if query_files.is_empty() {
                miette::bail!(
                    "No query files specified. Use positional arguments or configure in sqlvet.toml"
                );
            }

            let mut sources = Vec::with_capacity(query_files.len());
            for query_file in &query_files {
                let content = fs::read_to_string(query_file).into_diagnostic()?;
                sources.push((query_file.display().to_string(), content));
            }

            let report = check_sources(&registry, &engine, sources, uid, &config.vars);
            OutputFormatter::new(output_format).print_report(&report)?;

            // No findings are printed for a file that could not be validated
            for file in &report.files {
                if let Some(err) = file.error() {
                    let report = miette::Report::new(err.clone()).with_source_code(NamedSource::new(
                        file.file_name.clone(),
                        file.source.clone(),
                    ));
                    eprintln!("{:?}", report);
                }
            }

            let status = report.status();
            if status == CheckStatus::NotRun {
                eprintln!(
                    "Validation did not run for {} of {} file(s)",
                    report.not_run(),
                    report.files.len()
                );
                return Ok(status);
            }

            // Print summary
            if !args.quiet {
                let total_errors = report.count(Severity::Error);
                let total_warnings = report.count(Severity::Warning);
                if total_errors > 0 || total_warnings > 0 {
                    eprintln!(
                        "Found {} error(s), {} warning(s) in {} file(s)",
                        total_errors,
                        total_warnings,
                        report.files.len()
                    );
                } else {
                    eprintln!("All {} file(s) passed validation", report.files.len());
                }
            }

            Ok(status)
        }

        Command::Rules => {
            println!("{:<6} {:<18} {:<8} MESSAGE", "CODE", "NAME", "SEVERITY");
            for rule in builtin_rules() {
                println!(
                    "{:<6} {:<18} {:<8} {}",
                    rule.code(),
                    rule.name(),
                    rule.severity().to_string(),
                    rule.message()
                );
            }
            Ok(CheckStatus::Passed)
        }

        Command::Tokens { file, dialect } => {
            // Tokenize and display (for debugging)
            let content = fs::read_to_string(&file).into_diagnostic()?;
            let dialect: SqlDialect = dialect.parse().map_err(|e: String| miette::miette!(e))?;

            let tokens = SqlTokenizer::new(dialect).tokenize(&content).map_err(|err| {
                miette::Report::new(err)
                    .with_source_code(NamedSource::new(file.display().to_string(), content.clone()))
            })?;

            for token in tokens.iter().filter(|t| !t.is_trivia()) {
                let at = coordinate_of(&content, token.start)?;
                println!(
                    "{:>4}:{:<4} {:<18} {:?}",
                    at.line + 1,
                    at.column + 1,
                    format!("{:?}", token.kind),
                    token.text
                );
            }

            Ok(CheckStatus::Passed)
        }
    }
}

/// Build the validator chain from the built-in rules, honoring config
fn build_chain(config: &Config, dialect: SqlDialect) -> Result<ValidatorChain> {
    // Reject unknown codes up front instead of silently ignoring them
    for code in config.disable.iter().chain(config.rules.keys()) {
        rule_by_code(code)?;
    }

    let tokenizer: Arc<dyn Tokenize> = Arc::new(SqlTokenizer::new(dialect));
    let mut builder = ChainBuilder::new(VALIDATOR_NAME, tokenizer);

    for rule in builtin_rules() {
        if is_listed(&config.disable, rule.as_ref()) {
            continue;
        }
        let options = config
            .rules
            .iter()
            .find(|(key, _)| matches_rule(key, rule.as_ref()))
            .map(|(_, options)| options.clone())
            .unwrap_or_default();
        builder = builder.boxed_rule(rule, options);
    }

    Ok(builder.build())
}

fn matches_rule(key: &str, rule: &dyn LintRule) -> bool {
    key.eq_ignore_ascii_case(rule.code()) || key == rule.name()
}

fn is_listed(keys: &[String], rule: &dyn LintRule) -> bool {
    keys.iter().any(|key| matches_rule(key, rule))
}

/// Expand glob patterns into concrete file paths
fn collect_query_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut query_files = Vec::new();
    for pattern in patterns {
        if pattern.contains('*') {
            for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                query_files.push(path);
            }
        } else {
            query_files.push(PathBuf::from(pattern));
        }
    }
    Ok(query_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlvet_core::Validator;

    #[test]
    fn test_build_chain_applies_disable_and_options() {
        let config = Config::from_toml(
            r#"
            disable = ["union-distinct"]
            [rules.L001]
            severity = "error"
            "#,
        )
        .unwrap();
        let chain = build_chain(&config, SqlDialect::PostgreSQL).unwrap();
        assert_eq!(chain.rule_codes(), &["L001", "L003", "L004"]);

        let results = chain
            .validate_query("SELECT * FROM a UNION SELECT * FROM b", 0, 0)
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.severity == Severity::Error));
    }

    #[test]
    fn test_build_chain_rejects_unknown_rule() {
        let config = Config::from_toml(r#"disable = ["L042"]"#).unwrap();
        assert!(build_chain(&config, SqlDialect::PostgreSQL).is_err());
    }

    fn temp_query(name: &str, sql: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sqlvet-{}-{}", std::process::id(), name));
        fs::write(&path, sql).unwrap();
        path
    }

    #[test]
    fn test_tokens_fails_on_untokenizable_file() {
        let path = temp_query("tokens-bad.sql", "SELECT 'oops");
        let args = Args::parse_from(["sqlvet", "tokens", path.to_str().unwrap()]);
        let err = run(args).unwrap_err();
        assert!(err.to_string().contains("failed to tokenize"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_tokens_succeeds_on_valid_file() {
        let path = temp_query("tokens-ok.sql", "SELECT 1");
        let args = Args::parse_from(["sqlvet", "tokens", path.to_str().unwrap()]);
        assert_eq!(run(args).unwrap(), CheckStatus::Passed);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_check_reports_not_run_status() {
        let good = temp_query("check-good.sql", "SELECT * FROM t_users");
        let bad = temp_query("check-bad.sql", "SELECT 'oops");
        let args = Args::parse_from([
            "sqlvet",
            "-q",
            "check",
            good.to_str().unwrap(),
            bad.to_str().unwrap(),
        ]);
        let status = run(args).unwrap();
        assert_eq!(status, CheckStatus::NotRun);
        assert_eq!(status.exit_code(), 2);
        fs::remove_file(good).unwrap();
        fs::remove_file(bad).unwrap();
    }
}
