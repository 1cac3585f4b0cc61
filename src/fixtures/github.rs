use serde_json::{json, Value};

pub fn get_repository_json(organization: &str, name: &str, size: u64) -> Value {
    json!({
        "id": 1296269,
        "name": name,
        "full_name": format!("{}/{}", organization, name),
        "private": true,
        "ssh_url": format!("git@github.com:{}/{}.git", organization, name),
        "size": size,
    })
}

pub fn get_not_found_json() -> Value {
    json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest/repos/repos#get-a-repository",
    })
}
