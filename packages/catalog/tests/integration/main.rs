mod consistency;
mod lifecycle;
