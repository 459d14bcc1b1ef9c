/// Key-naming helpers matching §6.4's persisted state layout.

pub fn vcon_key(uuid: &str) -> String {
    format!("vcon:{uuid}")
}

pub fn dlq_list_key(ingress_name: &str) -> String {
    format!("DLQ:{ingress_name}")
}

pub fn dlq_meta_key(ingress_name: &str, uuid: &str) -> String {
    format!("DLQ:{ingress_name}:{uuid}")
}
