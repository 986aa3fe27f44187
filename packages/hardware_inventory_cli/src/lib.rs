//! Command-line tool that prints the hardware inventory of a Linux host.
//!
//! This crate provides the logic behind the `hwinv` binary, exposed via the [`render`]
//! function. The binary entry point is in `main.rs`.

use std::str::FromStr;

use hardware_inventory::{
    BlockInfo, Category, CpuInfo, GpuInfo, Options, PciInfo, Report, TopologyInfo,
};

/// The document format the inventory is printed in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// JSON, compact unless pretty printing is requested.
    #[default]
    Json,

    /// YAML. Always indented, so pretty printing makes no difference.
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!(
                "Invalid output format: '{s}'. Valid options are: json, yaml"
            )),
        }
    }
}

/// Parses the name of an inventory category, as accepted on the command line.
///
/// # Errors
///
/// Returns a message listing the valid names if `s` is not one of them.
pub fn parse_category(s: &str) -> Result<Category, String> {
    match s.to_lowercase().as_str() {
        "cpu" => Ok(Category::Cpu),
        "topology" => Ok(Category::Topology),
        "pci" => Ok(Category::Pci),
        "gpu" => Ok(Category::Gpu),
        "block" => Ok(Category::Block),
        _ => Err(format!(
            "Invalid category: '{s}'. Valid options are: cpu, topology, pci, gpu, block"
        )),
    }
}

/// Takes inventory of one category and renders it as a document in the requested format.
///
/// # Errors
///
/// Returns the error of the category if its inventory cannot be taken or rendered.
pub fn render(
    category: Category,
    format: OutputFormat,
    pretty: bool,
    options: &Options,
) -> hardware_inventory::Result<String> {
    match category {
        Category::Cpu => render_report(&CpuInfo::load(options)?, format, pretty),
        Category::Topology => render_report(&TopologyInfo::load(options)?, format, pretty),
        Category::Pci => render_report(&PciInfo::load(options)?, format, pretty),
        Category::Gpu => render_report(&GpuInfo::load(options)?, format, pretty),
        Category::Block => render_report(&BlockInfo::load(options)?, format, pretty),
        _ => Err(hardware_inventory::Error::UnsupportedPlatform { category }),
    }
}

fn render_report(
    report: &impl Report,
    format: OutputFormat,
    pretty: bool,
) -> hardware_inventory::Result<String> {
    match (format, pretty) {
        (OutputFormat::Json, false) => report.to_json(),
        (OutputFormat::Json, true) => report.to_json_pretty(),
        (OutputFormat::Yaml, _) => report.to_yaml(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use hardware_inventory::SilentDiagnostics;

    use super::*;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn options(root: &Path) -> Options {
        Options::new()
            .with_root(root)
            .with_diagnostics(SilentDiagnostics::default())
    }

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("YAML".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("xml".parse::<OutputFormat>().unwrap_err().contains("json, yaml"));
    }

    #[test]
    fn categories_parse_case_insensitively() {
        assert_eq!(parse_category("cpu"), Ok(Category::Cpu));
        assert_eq!(parse_category("Topology"), Ok(Category::Topology));
        assert_eq!(parse_category("PCI"), Ok(Category::Pci));
        assert_eq!(parse_category("gpu"), Ok(Category::Gpu));
        assert_eq!(parse_category("Block"), Ok(Category::Block));
        assert!(parse_category("memory").unwrap_err().contains("gpu, block"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn renders_cpu_as_json() {
        let root = tempfile::tempdir().unwrap();
        write(
            root.path(),
            "proc/cpuinfo",
            "processor : 0\nphysical id : 0\ncore id : 0\nvendor_id : AuthenticAMD\n",
        );

        let compact = render(
            Category::Cpu,
            OutputFormat::Json,
            false,
            &options(root.path()),
        )
        .unwrap();
        assert!(compact.starts_with(r#"{"cpu":{"total_cores":1,"total_threads":1,"#));

        let pretty = render(
            Category::Cpu,
            OutputFormat::Json,
            true,
            &options(root.path()),
        )
        .unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("AuthenticAMD"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn renders_topology_as_yaml() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "sys/devices/system/cpu/online", "0\n");
        write(
            root.path(),
            "sys/devices/system/cpu/cpu0/topology/core_id",
            "0\n",
        );

        let yaml = render(
            Category::Topology,
            OutputFormat::Yaml,
            false,
            &options(root.path()),
        )
        .unwrap();

        assert!(yaml.starts_with("topology:\n"), "{yaml}");
        assert!(yaml.contains("architecture: smp"), "{yaml}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn renders_block_as_json() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "sys/block/sda/size", "2048\n");
        write(root.path(), "sys/block/sda/sda1/partition", "1\n");
        write(root.path(), "sys/block/sda/sda1/size", "2000\n");
        write(root.path(), "proc/mounts", "/dev/sda1 /data ext4 rw 0 0\n");

        let json = render(
            Category::Block,
            OutputFormat::Json,
            false,
            &options(root.path()),
        )
        .unwrap();

        assert!(
            json.starts_with(r#"{"block":{"total_size_bytes":1048576,"disks":[{"name":"sda","#),
            "{json}"
        );
        assert!(json.contains(r#""mount_point":"/data","filesystem":"ext4""#), "{json}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_database_fails_pci() {
        let root = tempfile::tempdir().unwrap();

        let result = render(
            Category::Pci,
            OutputFormat::Json,
            false,
            &options(root.path()),
        );

        assert!(matches!(
            result,
            Err(hardware_inventory::Error::SourceUnavailable { .. })
        ));
    }
}
