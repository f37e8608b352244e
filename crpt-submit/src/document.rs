use serde::Deserialize;
use serde::Serialize;

/// A document as accepted by the document creation endpoint.
///
/// Field names on the wire follow the remote schema, which mixes
/// `camelCase` and `snake_case`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "participantInn", skip_serializing_if = "Option::is_none")]
    pub participant_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "importRequest", default)]
    pub import_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_inn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_number: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Document {
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }
}

/// A single product line of a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tnved_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uit_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uitu_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn it_uses_wire_field_names() {
        let doc = Document {
            participant_inn: Some("7700000000".into()),
            doc_id: Some("doc-1".into()),
            import_request: true,
            ..Default::default()
        }
        .with_product(Product {
            tnved_code: Some("6401100000".into()),
            uit_code: Some("010460".into()),
            ..Default::default()
        });

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "participantInn": "7700000000",
                "doc_id": "doc-1",
                "importRequest": true,
                "products": [
                    { "tnved_code": "6401100000", "uit_code": "010460" }
                ]
            })
        );
    }

    #[test]
    fn it_accepts_sparse_input() {
        let doc: Document = serde_json::from_value(json!({ "doc_type": "LP_INTRODUCE_GOODS" })).unwrap();

        assert_eq!(doc.doc_type.as_deref(), Some("LP_INTRODUCE_GOODS"));
        assert!(!doc.import_request);
        assert!(doc.products.is_empty());
    }
}
