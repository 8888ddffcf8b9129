pub mod form;
pub mod keybindings_help;
pub mod pet_form;
