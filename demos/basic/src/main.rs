use enclosure::{
    argument, object, Application, ClassMap, Constructor, Error, Loader, ServiceProvider, Shared, Wrap,
};
use tracing::info;

struct HelloWorld;

impl HelloWorld {
    fn greet(&self) -> String {
        "Hello world".to_string()
    }
}

struct Logger {
    prefix: String,
}

impl Logger {
    fn log(&self, message: &str) {
        println!("[{}] {}", self.prefix, message);
    }
}

struct App {
    hello: Shared<HelloWorld>,
    logger: Shared<Logger>,
}

struct Clock;

struct ExampleProvider;

impl ServiceProvider for ExampleProvider {
    fn register(&self, app: &Application) -> Result<(), Error> {
        app.bind_wrap("HelloWorld", Wrap::leaf(|_, _| Ok(object(HelloWorld))));
        app.bind_wrap_shared(
            "Logger",
            Wrap::leaf(|_, _| {
                Ok(object(Logger {
                    prefix: "basic".to_string(),
                }))
            }),
        );
        app.bind_wrap(
            "App",
            Wrap::new(["HelloWorld", "Logger"], |_, args| {
                Ok(object(App {
                    hello: argument(&args, 0)?,
                    logger: argument(&args, 1)?,
                }))
            }),
        );
        app.bind_alias("Greeter", "HelloWorld");
        Ok(())
    }

    fn boot(&self, app: &Application) -> Result<(), Error> {
        let logger = app.make_as::<Logger>("Logger")?;
        logger.log("ExampleProvider booted");
        Ok(())
    }

    fn provides(&self) -> Vec<String> {
        ["HelloWorld", "Logger", "App", "Greeter"].map(String::from).to_vec()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut classes = ClassMap::new();
    classes.add_constructor("/Support/Clock", Constructor::new(|_, _| Ok(object(Clock))))?;

    let mut loader = Loader::new();
    loader.add_map(classes);

    let app = Application::new();
    app.set_fallback(loader);
    app.add_provider(ExampleProvider);
    app.bootstrap()?;

    info!("Providers offer {:?}", app.provided_services());

    let main = app.make_as::<App>("App")?;
    main.logger.log(&main.hello.greet());

    let greeter = app.make_as::<HelloWorld>("Greeter")?;
    main.logger.log(&format!("Greeter says: {}", greeter.greet()));

    let same_logger = app.make_as::<Logger>("Logger")?;
    main.logger.log(&format!("Logger is shared: {}", Shared::ptr_eq(&main.logger, &same_logger)));

    app.make_as::<Clock>("Support/Clock")?;
    main.logger.log("Support/Clock resolved through the loader");

    println!("Application: {:?}", app);

    Ok(())
}
