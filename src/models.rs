pub mod audit;
pub mod documents;
pub mod finance;
pub mod organization;
pub mod users;

/// Registros novos nascem ativos quando o campo não é enviado.
pub(crate) fn default_active() -> bool {
    true
}

/// Nos payloads de atualização parcial, separa o campo ausente (`None`)
/// do `null` explícito (`Some(None)`), que limpa a coluna.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
