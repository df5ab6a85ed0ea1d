use std::path::PathBuf;

use keeper_core::config::{InstallerConfig, parse_keeper_toml_str};
use keeper_core::installer::{InstallContext, InstallationOrchestrator, PackageInstaller};
use keeper_core::package::{Package, PackageIdentity, SourceRef};
use keeper_core::template::resolve_install_path;

const CONFIG: &str = r#"
[custom-installer]
drupal-site = "sites/{$name}/"
custom-type = "custom/{$vendor}/{$name}/"
drupal-core = "web/"

[merge-exclusions]
drupal-core = ["core/vendor/", "modules/"]
"#;

fn package(full_name: &str, package_type: &str) -> Package {
    Package::new(
        PackageIdentity::new(full_name, package_type, "1.0.0"),
        SourceRef::Path {
            path: PathBuf::from("dist"),
        },
    )
}

#[test]
fn templates_resolve_from_identity() {
    let cases = [
        ("davidbarratt/davidwbarratt", "drupal-site", "sites/{$name}/", "sites/davidwbarratt/"),
        ("awesome/package", "custom-type", "custom/{$vendor}/{$name}/", "custom/awesome/package/"),
        ("drupal/core", "drupal-core", "web/", "web/"),
    ];
    for (name, package_type, template, expected) in cases {
        let identity = PackageIdentity::new(name, package_type, "1.0.0");
        assert_eq!(
            resolve_install_path(&identity, template),
            PathBuf::from(expected),
            "{name} with {template}"
        );
    }
}

#[test]
fn configured_types_are_supported() {
    let config = parse_keeper_toml_str(CONFIG).expect("config should parse");
    assert!(config.supports_type("drupal-site"));
    assert!(config.supports_type("custom-type"));
    assert!(config.supports_type("drupal-core"));
    assert!(!config.supports_type("library"));
}

#[test]
fn orchestrator_base_path_is_rooted_in_project() {
    let config = parse_keeper_toml_str(CONFIG).expect("config should parse");
    let root = PathBuf::from("/srv/project");
    let orchestrator = InstallationOrchestrator::new(InstallContext::new(root.clone(), config));

    let site = package("davidbarratt/davidwbarratt", "drupal-site");
    assert_eq!(
        orchestrator.base_path(&site),
        root.join("sites/davidwbarratt")
    );
    assert_eq!(
        orchestrator.install_path(&package("drupal/core", "drupal-core")),
        root.join("web")
    );
}

#[test]
fn unconfigured_types_land_in_vendor_dir() {
    let config = InstallerConfig::new();
    let identity = PackageIdentity::new("symfony/console", "library", "6.0.0");
    assert_eq!(
        config.install_path(&identity),
        PathBuf::from("vendor/symfony/console")
    );
}

#[test]
fn unknown_placeholders_survive_resolution() {
    let identity = PackageIdentity::new("acme/theme", "drupal-theme", "1.0.0");
    assert_eq!(
        resolve_install_path(&identity, "themes/{$name}/{$locale}/"),
        PathBuf::from("themes/theme/{$locale}/")
    );
}

#[test]
fn templates_naming_the_project_root_are_rejected() {
    let config = r#"
[custom-installer]
drupal-core = "./"

[merge-exclusions]
drupal-core = ["sites/"]
"#;
    let err = parse_keeper_toml_str(config).unwrap_err().to_string();
    assert!(err.contains("drupal-core"), "{err}");

    let escaping = "[custom-installer]\ndrupal-core = \"../web/\"\n";
    assert!(parse_keeper_toml_str(escaping).is_err());
}
