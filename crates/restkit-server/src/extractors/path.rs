use serde::Deserialize;

/// Extractor para rutas /todos/{id} y sus acciones
#[derive(Debug, Deserialize)]
pub struct EntityPath {
    pub id: String,
}

impl EntityPath {
    /// Decodifica el id (`%20` y similares).
    pub fn decoded_id(&self) -> String {
        urlencoding::decode(&self.id)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| self.id.trim().to_string())
    }

    /// Valida que el id no este vacio.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Id cannot be empty".to_string());
        }
        Ok(())
    }
}
