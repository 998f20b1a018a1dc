//! Test fixtures: manifests and package store layouts.

/// Manifest of an app with one runtime dependency and one build-only package.
pub const BLINKY_DEPS_JSON: &str = r#"{
  "runtimeTarget": { "name": ".NETCoreApp,Version=v8.0/linux-arm" },
  "targets": {
    ".NETCoreApp,Version=v8.0": {
      "Blinky/1.0.0": { "runtime": { "Blinky.dll": {} } }
    },
    ".NETCoreApp,Version=v8.0/linux-arm": {
      "Blinky/1.0.0": {
        "dependencies": {
          "Iot.Device.Bindings": "3.1.0",
          "StyleCop.Analyzers": "1.1.118"
        },
        "runtime": { "Blinky.dll": {} }
      },
      "Iot.Device.Bindings/3.1.0": {
        "runtime": {
          "lib/net8.0/Iot.Device.Bindings.dll": {},
          "lib/net8.0/Iot.Device.Bindings.Extra.dll": {}
        }
      },
      "StyleCop.Analyzers/1.1.118": {}
    }
  }
}"#;

/// Package store files `BLINKY_DEPS_JSON` needs, in the lower-cased layout.
pub const BLINKY_STORE: &[(&str, &str)] = &[(
    "iot.device.bindings/3.1.0/lib/net8.0/Iot.Device.Bindings.dll",
    "bindings",
)];

/// A published app tree with build leftovers that should not be shipped.
pub const BLINKY_PUBLISH: &[(&str, &str)] = &[
    ("Blinky.dll", "app"),
    ("Blinky.pdb", "symbols"),
    ("Blinky.deps.json", BLINKY_DEPS_JSON),
    ("Blinky.runtimeconfig.json", "{}"),
    ("wwwroot/index.html", "<html></html>"),
    ("wwwroot/css/site.css", "body {}"),
];
