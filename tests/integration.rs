mod integration {
    mod common;
    mod kv_certificate;
    mod kv_config;
    mod kv_version;
}
