use oildrop_traits::PositionSource;

/// In-memory position source, already in pixels.
#[derive(Debug, Clone, Default)]
pub struct VecSource(pub Vec<f64>);

impl PositionSource for VecSource {
    fn positions(&mut self) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.clone())
    }
}
