use crate::validate::{InvalidField, required};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::{fmt, str::FromStr};

/// Decimal amount kept as its exact text (`"12.50"`), the way the API
/// serializes decimal fields, so prices never pass through binary floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Price(String);

impl Price {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let unsigned = text.strip_prefix('-').unwrap_or(text);
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !digits(whole) || !digits(fraction) || unsigned.ends_with('.') {
            return Err(format!("invalid decimal {text:?}"));
        }

        Ok(Self(text.to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Disponivel,
    Baixo,
    Critico,
    Esgotado,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub quantidade: u32,
    #[serde(default)]
    pub estoque_minimo: u32,
    #[serde(default, deserialize_with = "decimal")]
    pub preco: Option<Price>,
    #[serde(default)]
    pub status_estoque: Option<StockStatus>,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub precisa_reposicao: Option<bool>,
    #[serde(default)]
    pub ativo: Option<bool>,
    #[serde(default)]
    pub data_criacao: Option<String>,
    #[serde(default)]
    pub data_atualizacao: Option<String>,
    #[serde(default)]
    pub criado_por: Option<i64>,
}

impl Product {
    /// Quantity at or below the configured minimum.
    #[must_use]
    pub fn needs_restock(&self) -> bool {
        self.precisa_reposicao
            .unwrap_or(self.quantidade <= self.estoque_minimo)
    }
}

/// Body for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub quantidade: u32,
    pub estoque_minimo: u32,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "decimal")]
    pub preco: Option<Price>,
}

impl ProductInput {
    /// # Errors
    /// Returns the first invalid field: empty `nome` or a negative `preco`.
    pub fn validate(&self) -> Result<(), InvalidField> {
        required("nome", &self.nome)?;
        if self.preco.as_ref().is_some_and(Price::is_negative) {
            return Err(InvalidField::new("preco", "must be a non-negative amount"));
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            nome: product.nome.clone(),
            descricao: product.descricao.clone(),
            quantidade: product.quantidade,
            estoque_minimo: product.estoque_minimo,
            preco: product.preco.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entrada,
    Saida,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub produto: i64,
    #[serde(default)]
    pub produto_nome: Option<String>,
    pub tipo_movimentacao: MovementKind,
    #[serde(default)]
    pub tipo_display: Option<String>,
    pub quantidade: u32,
    #[serde(default)]
    pub data_movimentacao: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub usuario: Option<i64>,
    #[serde(default)]
    pub usuario_nome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementInput {
    pub produto: i64,
    pub tipo_movimentacao: MovementKind,
    pub quantidade: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacao: Option<String>,
}

impl MovementInput {
    /// # Errors
    /// Returns an error when `quantidade` is zero.
    pub fn validate(&self) -> Result<(), InvalidField> {
        if self.quantidade == 0 {
            return Err(InvalidField::new("quantidade", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Critico,
    Atencao,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: i64,
    pub produto: i64,
    #[serde(default)]
    pub produto_nome: Option<String>,
    #[serde(default)]
    pub produto_quantidade: Option<u32>,
    #[serde(default)]
    pub produto_estoque_minimo: Option<u32>,
    pub tipo_alerta: AlertKind,
    #[serde(default)]
    pub tipo_display: Option<String>,
    pub mensagem: String,
    #[serde(default)]
    pub lido: bool,
    #[serde(default)]
    pub data_criacao: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_produtos: u64,
    pub produtos_em_estoque: u64,
    pub produtos_criticos: u64,
    pub alertas_nao_lidos: u64,
    #[serde(default)]
    pub ultimos_alertas: Vec<StockAlert>,
}

/// Decimal fields arrive as strings (`"12.50"`), numbers or null.
fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Price>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    let text = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Raw::Number(number)) => number.to_string(),
        Some(Raw::Text(text)) if text.trim().is_empty() => return Ok(None),
        Some(Raw::Text(text)) => text,
    };

    text.parse().map(Some).map_err(D::Error::custom)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "id": 12,
            "nome": "Martelo",
            "descricao": "Cabo de madeira",
            "quantidade": 3,
            "estoque_minimo": 5,
            "preco": "39.90",
            "status_estoque": "critico",
            "status_display": "Estoque Crítico",
            "precisa_reposicao": true,
            "ativo": true,
            "data_criacao": "2025-03-01T10:00:00Z",
            "data_atualizacao": "2025-03-02T10:00:00Z",
            "criado_por": 1
        })
    }

    #[test]
    fn product_parses_server_shape() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.nome, "Martelo");
        assert_eq!(product.preco.as_ref().map(Price::as_str), Some("39.90"));
        assert_eq!(product.status_estoque, Some(StockStatus::Critico));
        assert!(product.needs_restock());
    }

    #[test]
    fn preco_accepts_number_null_and_blank() {
        let mut value = product_json();
        value["preco"] = json!(10.5);
        assert_eq!(
            serde_json::from_value::<Product>(value.clone()).unwrap().preco,
            Some(Price("10.5".to_string()))
        );

        value["preco"] = json!(null);
        assert_eq!(serde_json::from_value::<Product>(value.clone()).unwrap().preco, None);

        value["preco"] = json!("");
        assert_eq!(serde_json::from_value::<Product>(value.clone()).unwrap().preco, None);

        value["preco"] = json!("abc");
        assert!(serde_json::from_value::<Product>(value).is_err());
    }

    #[test]
    fn price_keeps_exact_text() {
        let price: Price = "0.10".parse().unwrap();
        assert_eq!(price.to_string(), "0.10");
        assert_eq!(serde_json::to_value(&price).unwrap(), json!("0.10"));
        assert!(!price.is_negative());
        assert!("-3".parse::<Price>().unwrap().is_negative());

        for bad in ["", ".5", "1.", "1.2.3", "1e5", "abc", "--1"] {
            assert!(bad.parse::<Price>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn needs_restock_falls_back_to_levels() {
        let mut value = product_json();
        value.as_object_mut().unwrap().remove("precisa_reposicao");
        value["quantidade"] = json!(9);
        let product: Product = serde_json::from_value(value).unwrap();
        assert!(!product.needs_restock());
    }

    #[test]
    fn product_input_validation() {
        let mut input = ProductInput {
            nome: "Serrote".to_string(),
            descricao: None,
            quantidade: 0,
            estoque_minimo: 0,
            preco: None,
        };
        assert_eq!(input.validate(), Ok(()));

        input.preco = Some("-1.00".parse().unwrap());
        assert_eq!(
            input.validate(),
            Err(InvalidField::new("preco", "must be a non-negative amount"))
        );

        input.preco = Some("0".parse().unwrap());
        input.nome = " ".to_string();
        assert_eq!(input.validate(), Err(InvalidField::new("nome", "is required")));
    }

    #[test]
    fn product_input_omits_unset_optionals() {
        let input = ProductInput {
            nome: "Serrote".to_string(),
            descricao: None,
            quantidade: 4,
            estoque_minimo: 1,
            preco: None,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"nome": "Serrote", "quantidade": 4, "estoque_minimo": 1})
        );
    }

    #[test]
    fn movement_input_requires_positive_quantity() {
        let input = MovementInput {
            produto: 1,
            tipo_movimentacao: MovementKind::Saida,
            quantidade: 0,
            observacao: None,
        };
        assert!(input.validate().is_err());
        assert_eq!(
            serde_json::to_value(MovementInput { quantidade: 2, ..input }).unwrap(),
            json!({"produto": 1, "tipo_movimentacao": "saida", "quantidade": 2})
        );
    }

    #[test]
    fn dashboard_parses_recent_alerts() {
        let dashboard: Dashboard = serde_json::from_value(json!({
            "total_produtos": 10,
            "produtos_em_estoque": 7,
            "produtos_criticos": 2,
            "alertas_nao_lidos": 1,
            "ultimos_alertas": [{
                "id": 4,
                "produto": 12,
                "produto_nome": "Martelo",
                "produto_quantidade": 3,
                "produto_estoque_minimo": 5,
                "tipo_alerta": "critico",
                "tipo_display": "Crítico",
                "mensagem": "Estoque abaixo do mínimo",
                "lido": false,
                "data_criacao": "2025-03-02T10:00:00Z"
            }]
        }))
        .unwrap();
        assert_eq!(dashboard.ultimos_alertas.len(), 1);
        assert_eq!(dashboard.ultimos_alertas[0].tipo_alerta, AlertKind::Critico);
    }
}
