//! Build script: audits the message bundles before they are embedded.

use std::path::Path;

#[path = "build_bundle_audit.rs"]
mod bundle_audit;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build_bundle_audit.rs");
    for locale in bundle_audit::LOCALES {
        println!("cargo:rerun-if-changed=messages/{locale}.json");
    }

    // Bundles are embedded into the binary, so drift is a build failure.
    bundle_audit::audit_message_bundles(Path::new("messages"))?;
    Ok(())
}
