fn main() {
    #[cfg(target_os = "windows")]
    {
        let mut res = winres::WindowsResource::new();
        res.set_icon("assets/logo.ico");
        res.set("ProductName", "Bankruptcy Prediction Dashboard");
        res.set("FileDescription", "Batch bankruptcy prediction with a pre-trained model");
        res.compile().expect("Failed to compile Windows resources");
    }
}
