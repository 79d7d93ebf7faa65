use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::errors::ClientError;
use crate::domain::order::{Account, Product};
use crate::domain::ports::{AccountDirectory, ProductCatalog};

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

fn build_client(timeout: Duration) -> Result<Client, ClientError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::Transport(format!("'{}' cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_base(base_url: &str) -> Result<Url, ClientError> {
    Url::parse(base_url)
        .map_err(|e| ClientError::Transport(format!("invalid base URL '{}': {}", base_url, e)))
}

// ── Account service ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AccountBody {
    id: String,
    name: String,
}

pub struct HttpAccountDirectory {
    http: Client,
    base: Url,
}

impl HttpAccountDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_client(timeout)?,
            base: parse_base(base_url)?,
        })
    }
}

#[async_trait]
impl AccountDirectory for HttpAccountDirectory {
    async fn get_account(&self, id: &str) -> Result<Account, ClientError> {
        let url = endpoint(&self.base, &["accounts", id])?;
        let resp = self.http.get(url).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound),
            s if s.is_success() => {
                let body: AccountBody = resp.json().await?;
                Ok(Account {
                    id: body.id,
                    name: body.name,
                })
            }
            s => Err(ClientError::Status(s.as_u16())),
        }
    }
}

// ── Catalog service ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ProductBody {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct ProductsBody {
    products: Vec<ProductBody>,
}

pub struct HttpProductCatalog {
    http: Client,
    base: Url,
}

impl HttpProductCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_client(timeout)?,
            base: parse_base(base_url)?,
        })
    }

    async fn fetch(&self, query: &[(&str, String)]) -> Result<Vec<Product>, ClientError> {
        let url = endpoint(&self.base, &["products"])?;
        let resp = self.http.get(url).query(query).send().await?;

        if !resp.status().is_success() {
            return Err(ClientError::Status(resp.status().as_u16()));
        }

        let body: ProductsBody = resp.json().await?;
        Ok(body
            .products
            .into_iter()
            .map(|p| Product {
                id: p.id,
                name: p.name,
                description: p.description,
                price: p.price,
            })
            .collect())
    }
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, ClientError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.fetch(&[("ids", ids.join(","))]).await
    }

    async fn get_products(&self, skip: u64, take: u64) -> Result<Vec<Product>, ClientError> {
        self.fetch(&[("skip", skip.to_string()), ("take", take.to_string())])
            .await
    }

    async fn search_products(
        &self,
        query: &str,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Product>, ClientError> {
        self.fetch(&[
            ("query", query.to_string()),
            ("skip", skip.to_string()),
            ("take", take.to_string()),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use actix_web::{web, App, HttpResponse, HttpServer};
    use serde_json::json;

    use super::*;

    async fn account(path: web::Path<String>) -> HttpResponse {
        match path.as_str() {
            "acc-1" => HttpResponse::Ok().json(json!({ "id": "acc-1", "name": "Ada" })),
            "broken" => HttpResponse::InternalServerError().finish(),
            _ => HttpResponse::NotFound().finish(),
        }
    }

    // Echoes the query back through the product fields.
    async fn products(query: web::Query<HashMap<String, String>>) -> HttpResponse {
        let products: Vec<_> = match query.get("ids") {
            Some(ids) => ids
                .split(',')
                .filter(|id| *id != "missing")
                .map(|id| json!({ "id": id, "name": "n", "description": "d", "price": 1.5 }))
                .collect(),
            None => vec![json!({
                "id": "page",
                "name": query.get("query").cloned().unwrap_or_default(),
                "description": format!("{}-{}", query["skip"], query["take"]),
                "price": 0.0
            })],
        };
        HttpResponse::Ok().json(json!({ "products": products }))
    }

    fn start_stub() -> String {
        let server = HttpServer::new(|| {
            App::new()
                .route("/accounts/{id}", web::get().to(account))
                .route("/products", web::get().to(products))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind failed");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[actix_web::test]
    async fn get_account_parses_body() {
        let base = start_stub();
        let accounts = HttpAccountDirectory::new(&base, TIMEOUT).unwrap();

        let account = accounts.get_account("acc-1").await.unwrap();

        assert_eq!(account.id, "acc-1");
        assert_eq!(account.name, "Ada");
    }

    #[actix_web::test]
    async fn get_account_maps_404_to_not_found() {
        let base = start_stub();
        let accounts = HttpAccountDirectory::new(&base, TIMEOUT).unwrap();

        let result = accounts.get_account("nobody").await;

        assert!(matches!(result, Err(ClientError::NotFound)));
    }

    #[actix_web::test]
    async fn get_account_reports_unexpected_status() {
        let base = start_stub();
        let accounts = HttpAccountDirectory::new(&base, TIMEOUT).unwrap();

        let result = accounts.get_account("broken").await;

        assert!(matches!(result, Err(ClientError::Status(500))));
    }

    #[actix_web::test]
    async fn get_products_by_ids_omits_unknown_ids() {
        let base = start_stub();
        let catalog = HttpProductCatalog::new(&base, TIMEOUT).unwrap();

        let products = catalog
            .get_products_by_ids(&["p1".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "p1");
        assert_eq!(products[0].price, 1.5);
    }

    #[actix_web::test]
    async fn search_products_sends_paging_parameters() {
        let base = start_stub();
        let catalog = HttpProductCatalog::new(&base, TIMEOUT).unwrap();

        let products = catalog.search_products("pen", 10, 5).await.unwrap();

        assert_eq!(products[0].name, "pen");
        assert_eq!(products[0].description, "10-5");
    }

    #[actix_web::test]
    async fn get_products_pages_without_query() {
        let base = start_stub();
        let catalog = HttpProductCatalog::new(&base, TIMEOUT).unwrap();

        let products = catalog.get_products(0, 20).await.unwrap();

        assert_eq!(products[0].name, "");
        assert_eq!(products[0].description, "0-20");
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let base = Url::parse("http://catalog:8082/api/").unwrap();
        let url = endpoint(&base, &["accounts", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://catalog:8082/api/accounts/a%2Fb");
    }
}
