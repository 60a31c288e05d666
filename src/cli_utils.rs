use std::process;
use std::str::FromStr;

/// Output format of `storefrontctl`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{}' (expected json or yaml)", other)),
        }
    }
}

/// Exits the program with an error message
pub fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exits the program with an error message and usage information
pub fn exit_with_usage_error(message: &str, usage: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", usage);
    process::exit(1);
}

/// Prints formatted JSON with proper indentation
pub fn print_json<T>(value: &T) -> Result<(), serde_json::Error>
where
    T: serde::Serialize,
{
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a value as YAML
pub fn print_yaml<T>(value: &T) -> Result<(), serde_yml::Error>
where
    T: serde::Serialize,
{
    print!("{}", serde_yml::to_string(value)?);
    Ok(())
}

/// Prints a value in `format` or exits with error
pub fn print_or_exit<T>(value: &T, format: OutputFormat, context: &str)
where
    T: serde::Serialize,
{
    let result = match format {
        OutputFormat::Json => print_json(value).map_err(|e| e.to_string()),
        OutputFormat::Yaml => print_yaml(value).map_err(|e| e.to_string()),
    };
    if let Err(e) = result {
        exit_with_error(&format!("Failed to format {}: {}", context, e));
    }
}
