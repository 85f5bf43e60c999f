//! Interactive documentation for the HTTP surface: a small console page at
//! `/docs` and a machine-readable description at `/openapi.json`.

use axum::response::Html;
use axum::Json;
use serde_json::{json, Value};

pub async fn docs_page() -> Html<&'static str> {
    Html(DOCS_HTML)
}

pub async fn openapi_document() -> Json<Value> {
    Json(openapi())
}

pub fn openapi() -> Value {
    let name_param = json!([{
        "name": "name",
        "in": "path",
        "required": true,
        "schema": {"type": "string"}
    }]);
    let envelope = |data: Value| {
        json!({
            "type": "object",
            "required": ["message", "data"],
            "properties": {"message": {"type": "string"}, "data": data}
        })
    };
    let entry = json!({
        "type": "object",
        "required": ["name", "url"],
        "properties": {"name": {"type": "string"}, "url": {"type": "string"}},
        "additionalProperties": true
    });
    let error = json!({"$ref": "#/components/schemas/Error"});

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Dataset Registry",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Discover, fetch, add and edit dataset descriptors."
        },
        "paths": {
            "/dataset": {
                "get": {
                    "summary": "All datasets available",
                    "responses": {
                        "200": {"description": "Every dataset", "content": {"application/json": {"schema": envelope(json!({"type": "object", "additionalProperties": entry}))}}},
                        "404": {"description": "No datasets available", "content": {"application/json": {"schema": error}}},
                        "500": {"description": "Configuration file missing or corrupt", "content": {"application/json": {"schema": error}}}
                    }
                }
            },
            "/dataset/get/{name}": {
                "get": {
                    "summary": "Get dataset",
                    "parameters": name_param,
                    "responses": {
                        "200": {"description": "The dataset", "content": {"application/json": {"schema": envelope(entry.clone())}}},
                        "404": {"description": "Unknown dataset", "content": {"application/json": {"schema": error}}},
                        "500": {"description": "Configuration file missing or corrupt", "content": {"application/json": {"schema": error}}}
                    }
                }
            },
            "/dataset/add/{name}": {
                "post": {
                    "summary": "Add dataset",
                    "parameters": name_param,
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "required": ["name", "url"],
                            "properties": {"name": {"type": "string"}, "url": {"type": "string"}}
                        }}}
                    },
                    "responses": {
                        "200": {"description": "The added dataset", "content": {"application/json": {"schema": envelope(entry.clone())}}},
                        "400": {"description": "Dataset already exists", "content": {"application/json": {"schema": error}}},
                        "422": {"description": "Invalid body", "content": {"application/json": {"schema": error}}},
                        "500": {"description": "Configuration file missing, corrupt or not writable", "content": {"application/json": {"schema": error}}}
                    }
                }
            },
            "/dataset/edit/{name}": {
                "patch": {
                    "summary": "Edit dataset",
                    "parameters": name_param,
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {"type": "object", "additionalProperties": true}}}
                    },
                    "responses": {
                        "200": {"description": "The updated dataset", "content": {"application/json": {"schema": envelope(entry)}}},
                        "404": {"description": "Unknown dataset", "content": {"application/json": {"schema": error}}},
                        "422": {"description": "Invalid body", "content": {"application/json": {"schema": error}}},
                        "500": {"description": "Configuration file missing, corrupt or not writable", "content": {"application/json": {"schema": error}}}
                    }
                }
            },
            "/health": {
                "get": {"summary": "Liveness", "responses": {"200": {"description": "Service is up"}}}
            }
        },
        "components": {
            "schemas": {
                "Error": {
                    "type": "object",
                    "required": ["status", "kind", "message"],
                    "properties": {
                        "status": {"type": "string", "enum": ["error"]},
                        "kind": {"type": "string"},
                        "message": {"type": "string"},
                        "errors": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "field": {"type": "string"},
                                    "messages": {"type": "array", "items": {"type": "string"}}
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

const DOCS_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Dataset Registry API</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    h1 { margin-bottom: 8px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input, textarea { width: 100%; padding: 8px; box-sizing: border-box; font-family: monospace; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 180px; }
  </style>
</head>
<body>
  <h1>Dataset Registry</h1>
  <p>Browse and edit the dataset descriptors. The machine-readable description lives at <a href="/openapi.json">/openapi.json</a>.</p>

  <div class="card">
    <strong>All datasets</strong>
    <div><button id="list-btn">GET /dataset</button></div>
  </div>

  <div class="card">
    <strong>One dataset</strong>
    <label for="name">Dataset name</label>
    <input id="name" value="iris" />
    <div>
      <button id="get-btn">GET /dataset/get/{name}</button>
    </div>
    <label for="body">Body</label>
    <textarea id="body" rows="5">{"name": "iris", "url": "https://www.kaggle.com/datasets/uciml/iris"}</textarea>
    <div>
      <button id="add-btn">POST /dataset/add/{name}</button>
      <button id="edit-btn">PATCH /dataset/edit/{name}</button>
    </div>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');
    const nameEl = document.getElementById('name');
    const bodyEl = document.getElementById('body');

    async function request(path, options) {
      output.textContent = 'Loading…';
      const response = await fetch(path, options);
      const text = await response.text();
      output.textContent = 'HTTP ' + response.status + '\n' + text;
    }

    function datasetPath(prefix) {
      return prefix + encodeURIComponent(nameEl.value.trim());
    }

    function withBody(method) {
      return { method, headers: { 'Content-Type': 'application/json' }, body: bodyEl.value };
    }

    document.getElementById('list-btn').addEventListener('click', () => {
      request('/dataset', { method: 'GET' });
    });
    document.getElementById('get-btn').addEventListener('click', () => {
      request(datasetPath('/dataset/get/'), { method: 'GET' });
    });
    document.getElementById('add-btn').addEventListener('click', () => {
      request(datasetPath('/dataset/add/'), withBody('POST'));
    });
    document.getElementById('edit-btn').addEventListener('click', () => {
      request(datasetPath('/dataset/edit/'), withBody('PATCH'));
    });
  </script>
</body>
</html>
"#;
