use serde_json::{json, Value};

pub fn get_repository_json(workspace: &str, name: &str) -> Value {
    json!({
        "type": "repository",
        "name": name,
        "full_name": format!("{}/{}", workspace, name),
        "is_private": true,
        "scm": "git",
        "links": {
            "clone": [
                {"name": "https", "href": format!("https://bitbucket.org/{}/{}.git", workspace, name)},
                {"name": "ssh", "href": format!("git@bitbucket.org:{}/{}.git", workspace, name)}
            ]
        }
    })
}

pub fn get_page_json(values: Vec<Value>, next: Option<String>) -> Value {
    let mut page = json!({
        "pagelen": 10,
        "values": values,
    });
    if let Some(next) = next {
        page["next"] = json!(next);
    }
    page
}
