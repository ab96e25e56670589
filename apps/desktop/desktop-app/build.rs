fn main() {
    #[cfg(feature = "webview")]
    tauri_build::build();
}
