//! Shared test fixtures

/// The Flutter application template this crate's record format mirrors
pub(crate) const FLUTTER_TEMPLATE: &str = r#"
plugins = ["com.android.application", "kotlin-android", "dev.flutter.flutter-gradle-plugin"]

[android]
namespace = "com.example.connect"
compile_sdk = { from = "flutter.compileSdkVersion" }
ndk_version = "27.0.12077973"

[android.compile_options]
source_compatibility = "VERSION_11"
target_compatibility = "VERSION_11"
core_library_desugaring = true

[android.kotlin_options]
jvm_target = "11"

[android.default_config]
application_id = "com.example.connect"
min_sdk = { from = "flutter.minSdkVersion" }
target_sdk = { from = "flutter.targetSdkVersion" }
version_code = { from = "flutter.versionCode" }
version_name = { from = "flutter.versionName" }
multidex = true

[android.build_types.release]
signing_config = "debug"

[[dependencies]]
configuration = "coreLibraryDesugaring"
notation = "com.android.tools:desugar_jdk_libs:2.0.4"

[framework]
source = "../.."
"#;

/// A minimal application document with literal SDK levels
pub(crate) fn literal_doc(min_sdk: u32, target_sdk: u32, compile_sdk: u32) -> String {
    format!(
        r#"
plugins = ["com.android.application"]

[android]
namespace = "org.sample.app"
compile_sdk = {compile_sdk}

[android.default_config]
min_sdk = {min_sdk}
target_sdk = {target_sdk}
version_code = 1
version_name = "1.0"
"#
    )
}
