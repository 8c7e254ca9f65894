//! Program and manifest files written into temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use indoc::indoc;

pub const PROGRAM: &str = indoc! {r#"
    {
      "entry_point": { "assembly": "App", "type": "App.Main", "member": "Void Run()" },
      "assemblies": [
        {
          "name": "App",
          "references": ["Core"],
          "types": [
            {
              "name": "App.Main",
              "base": { "assembly": "Core", "type": "System.Object" },
              "methods": [
                { "signature": "Void Run()", "name": "Run", "static": true,
                  "body": { "weight": 3, "script": "go();",
                            "calls": [{ "assembly": "App", "type": "App.Main", "member": "Int32 Twice(Int32)" }] } },
                { "signature": "Int32 Twice(Int32)", "name": "Twice", "static": true, "params": 1,
                  "body": { "weight": 2, "script": "return a0 * 2;" } }
              ]
            },
            {
              "name": "App.Shape",
              "methods": [
                { "signature": "Double Area()", "name": "Area", "flags": ["virtual"],
                  "body": { "weight": 1, "script": "return 0;" } }
              ]
            }
          ]
        },
        {
          "name": "Core",
          "defines_metadata": true,
          "types": [{ "name": "System.Object" }]
        }
      ]
    }
"#};

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
