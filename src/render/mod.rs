pub(crate) mod backend;
pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod fit;
pub(crate) mod reveal;
pub(crate) mod stroke;
