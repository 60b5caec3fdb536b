pub mod particles;
pub mod rain;
pub mod shapes;

pub use particles::ParticleField;
pub use rain::ProceduralRain;
pub use shapes::FloatingShapes;
